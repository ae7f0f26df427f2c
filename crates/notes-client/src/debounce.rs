//! Debounced search input.
//!
//! Each push restarts a single pending timer; only the last value of a
//! quiet window is delivered, no sooner than the delay after the last push.
//! Dropping the debouncer cancels whatever is pending.

use crate::timer::ScheduledTask;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::trace;

/// Quiet period before search text is propagated.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: ScheduledTask,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer and the receiver its values are delivered on.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                delay,
                tx,
                pending: ScheduledTask::new(),
            },
            rx,
        )
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending value and restart the timer.
    pub fn push(&mut self, value: T) {
        let tx = self.tx.clone();
        if self.pending.is_pending() {
            trace!("Debounce timer restarted");
        }
        self.pending.schedule(self.delay, move || {
            // Receiver dropped means nobody is listening anymore.
            let _ = tx.send(value);
        });
    }

    /// Drop the pending value without delivering it.
    pub fn cancel(&mut self) -> bool {
        self.pending.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }
}
