//! Single-owner cancellable scheduled tasks.
//!
//! A `ScheduledTask` owns at most one pending tokio task. Scheduling again
//! aborts the pending one first, and dropping the handle aborts it too.
//! Scheduling requires a running tokio runtime.

use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` once `delay` has elapsed, replacing any pending action.
    pub fn schedule<F>(&mut self, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        }));
    }

    /// Abort the pending action. Returns true if one was still pending.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                pending
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Box<dyn FnOnce() + Send>) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        let make = move || {
            let count = Arc::clone(&count_clone);
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }) as Box<dyn FnOnce() + Send>
        };
        (count, make)
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_after_delay() {
        let (count, action) = counter();
        let mut task = ScheduledTask::new();
        task.schedule(Duration::from_millis(100), action());
        assert!(task.is_pending());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!task.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending() {
        let (count, action) = counter();
        let mut task = ScheduledTask::new();
        task.schedule(Duration::from_millis(100), action());
        tokio::time::sleep(Duration::from_millis(50)).await;
        task.schedule(Duration::from_millis(100), action());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (count, action) = counter();
        let mut task = ScheduledTask::new();
        task.schedule(Duration::from_millis(100), action());
        drop(task);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_reports_pending() {
        let (_count, action) = counter();
        let mut task = ScheduledTask::new();
        assert!(!task.cancel());
        task.schedule(Duration::from_millis(100), action());
        assert!(task.cancel());
        assert!(!task.is_pending());
    }
}
