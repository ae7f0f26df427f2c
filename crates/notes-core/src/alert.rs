//! Transient alerts derived from sync outcomes.
//!
//! Only the most recent alert is ever shown. `AlertState` hands out a ticket
//! per shown alert; an expiry carrying an outdated ticket is ignored, so the
//! hide timer of a replaced alert cannot touch its successor.

use std::time::Duration;

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Error,
    Success,
    Info,
}

/// A user-visible notification with its display duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub message: String,
    pub display_duration: Duration,
}

impl AlertEvent {
    pub fn new(kind: AlertKind, message: impl Into<String>, display_duration: Duration) -> Self {
        Self {
            kind,
            message: message.into(),
            display_duration,
        }
    }

    /// Shown when any remote call fails.
    pub fn error() -> Self {
        Self::new(
            AlertKind::Error,
            "Oops, something went wrong",
            Duration::from_millis(8000),
        )
    }

    /// Shown after a confirmed create or update.
    pub fn saved() -> Self {
        Self::new(
            AlertKind::Success,
            "Successfully saved",
            Duration::from_millis(4000),
        )
    }

    /// Shown after a confirmed delete.
    pub fn deleted() -> Self {
        Self::new(AlertKind::Info, "Note deleted", Duration::from_millis(4000))
    }
}

/// Receiver of alerts raised by the sync client.
pub trait AlertSink: Send + Sync {
    fn emit(&self, event: AlertEvent);
}

impl<F> AlertSink for F
where
    F: Fn(AlertEvent) + Send + Sync,
{
    fn emit(&self, event: AlertEvent) {
        self(event)
    }
}

/// Identifies one showing of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertTicket(u64);

/// Latest alert plus its visibility.
#[derive(Debug, Clone, Default)]
pub struct AlertState {
    current: Option<AlertEvent>,
    visible: bool,
    generation: u64,
}

impl AlertState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is shown with `event`.
    pub fn show(&mut self, event: AlertEvent) -> AlertTicket {
        self.generation += 1;
        self.current = Some(event);
        self.visible = true;
        AlertTicket(self.generation)
    }

    /// Hide the alert if `ticket` still refers to it. Returns whether it did.
    pub fn expire(&mut self, ticket: AlertTicket) -> bool {
        if ticket.0 != self.generation || !self.visible {
            return false;
        }
        self.visible = false;
        true
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The alert currently on screen.
    pub fn visible(&self) -> Option<&AlertEvent> {
        self.current.as_ref().filter(|_| self.visible)
    }

    /// The last alert shown, even after it was hidden.
    pub fn latest(&self) -> Option<&AlertEvent> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(AlertEvent::error().kind, AlertKind::Error);
        assert_eq!(AlertEvent::error().display_duration, Duration::from_secs(8));
        assert_eq!(AlertEvent::saved().message, "Successfully saved");
        assert_eq!(AlertEvent::deleted().kind, AlertKind::Info);
    }

    #[test]
    fn test_expire_hides_current() {
        let mut state = AlertState::new();
        let ticket = state.show(AlertEvent::saved());
        assert!(state.is_visible());
        assert!(state.expire(ticket));
        assert!(state.visible().is_none());
        assert_eq!(state.latest(), Some(&AlertEvent::saved()));
    }

    #[test]
    fn test_replaced_alert_ticket_is_ignored() {
        let mut state = AlertState::new();
        let first = state.show(AlertEvent::saved());
        let second = state.show(AlertEvent::error());

        assert!(!state.expire(first));
        assert_eq!(state.visible(), Some(&AlertEvent::error()));

        assert!(state.expire(second));
        assert!(!state.expire(first));
        assert!(state.visible().is_none());
    }

    #[test]
    fn test_closure_sink() {
        let seen = std::sync::Mutex::new(Vec::new());
        let sink = |event: AlertEvent| seen.lock().unwrap().push(event.kind);
        sink.emit(AlertEvent::deleted());
        assert_eq!(*seen.lock().unwrap(), vec![AlertKind::Info]);
    }
}
