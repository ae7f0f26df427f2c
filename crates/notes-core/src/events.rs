//! Store change notifications.
//!
//! `StoreEvent` describes a single change to the note store: a confirmed
//! mutation, a filter change, or list request progress.
//! `EventBus` fans events out to any number of views; a `Subscription`
//! unsubscribes when dropped.

use crate::note::NoteId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// A change to the note store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StoreEvent {
    /// The note list was replaced wholesale by a list response.
    NotesReplaced { count: usize },
    /// A note was appended after a confirmed create.
    NoteAdded { id: NoteId },
    /// A note was replaced in place after a confirmed update.
    NoteUpdated { id: NoteId },
    /// A note was removed after a confirmed delete.
    NoteRemoved { id: NoteId },
    /// The active filter changed.
    FilterChanged,
    /// A list request started or settled.
    ListStatusChanged { fetching: bool, failed: bool },
}

type Listener = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// Keeps a listener registered; dropping it removes the listener.
pub struct Subscription {
    bus: Weak<EventBus>,
    key: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.key);
        }
    }
}

/// Fan-out of store events to the views listening on the store.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<BTreeMap<u64, Listener>>,
    next_key: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`; it stays registered while the returned
    /// `Subscription` is alive. Listeners run in registration order.
    pub fn subscribe(
        self: &Arc<Self>,
        listener: impl Fn(&StoreEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let key = self.next_key.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, Arc::new(listener));
        Subscription {
            bus: Arc::downgrade(self),
            key,
        }
    }

    fn remove(&self, key: u64) {
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&key);
    }

    /// Deliver `event` to every listener. The listener list is copied first,
    /// so listeners may subscribe or drop subscriptions while handling it.
    pub fn emit(&self, event: &StoreEvent) {
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        listeners.iter().for_each(|listener| listener(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_subscribers_receive_events() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let _sub = bus.subscribe(move |event| {
            seen_clone.lock().unwrap().push(event.clone());
        });

        bus.emit(&StoreEvent::NoteAdded { id: "a".into() });
        bus.emit(&StoreEvent::FilterChanged);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                StoreEvent::NoteAdded { id: "a".into() },
                StoreEvent::FilterChanged
            ]
        );
    }

    #[test]
    fn test_subscription_unsubscribes_on_drop() {
        let bus = Arc::new(EventBus::new());
        let count = Arc::new(AtomicU64::new(0));
        let count_clone = Arc::clone(&count);

        let sub = bus.subscribe(move |_| {
            count_clone.fetch_add(1, Ordering::Relaxed);
        });
        bus.emit(&StoreEvent::FilterChanged);
        drop(sub);
        bus.emit(&StoreEvent::FilterChanged);

        assert_eq!(count.load(Ordering::Relaxed), 1);
        assert!(bus.listeners.read().unwrap().is_empty());
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_string(&StoreEvent::NoteRemoved { id: "x".into() }).unwrap();
        assert_eq!(json, r#"{"type":"noteRemoved","id":"x"}"#);

        let json = serde_json::to_string(&StoreEvent::ListStatusChanged {
            fetching: true,
            failed: false,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"listStatusChanged","fetching":true,"failed":false}"#);
    }
}
