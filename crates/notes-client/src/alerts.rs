//! Timed alert emitter.
//!
//! Shows the latest alert and hides it once its display duration elapses.
//! A new alert replaces the visible one outright and restarts the timer;
//! alerts are never queued.

use crate::timer::ScheduledTask;
use notes_core::{AlertEvent, AlertSink, AlertState};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::debug;

struct Shared {
    state: Mutex<AlertState>,
    visible_tx: watch::Sender<Option<AlertEvent>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, AlertState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, state: &AlertState) {
        self.visible_tx.send_replace(state.visible().cloned());
    }
}

pub struct AlertEmitter {
    shared: Arc<Shared>,
    hide_timer: Mutex<ScheduledTask>,
}

impl Default for AlertEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertEmitter {
    pub fn new() -> Self {
        let (visible_tx, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(AlertState::new()),
                visible_tx,
            }),
            hide_timer: Mutex::new(ScheduledTask::new()),
        }
    }

    /// The alert currently on screen, if any.
    pub fn current(&self) -> Option<AlertEvent> {
        self.shared.lock().visible().cloned()
    }

    /// Watch the visible alert; `None` once it is hidden.
    pub fn watch(&self) -> watch::Receiver<Option<AlertEvent>> {
        self.shared.visible_tx.subscribe()
    }
}

impl AlertSink for AlertEmitter {
    /// Must be called from within a tokio runtime.
    fn emit(&self, event: AlertEvent) {
        let duration = event.display_duration;
        debug!("Showing {:?} alert: {}", event.kind, event.message);

        // Held across show and schedule so the pending timer always carries
        // the newest ticket. Lock order: hide_timer, then state.
        let mut hide_timer = self.hide_timer.lock().unwrap_or_else(|e| e.into_inner());
        let ticket = {
            let mut state = self.shared.lock();
            let ticket = state.show(event);
            self.shared.publish(&state);
            ticket
        };

        let shared = Arc::clone(&self.shared);
        hide_timer.schedule(duration, move || {
            let mut state = shared.lock();
            if state.expire(ticket) {
                shared.publish(&state);
            }
        });
    }
}
