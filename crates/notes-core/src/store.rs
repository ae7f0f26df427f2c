//! Shared note store.
//!
//! The single authoritative in-memory holder of the note list and the
//! active filter. It is shared by `Arc` and mutated only through the methods
//! below; each method takes the lock once, so every mutation is atomic on its
//! own but a read between two mutations may observe the intermediate state.

use crate::api::ApiError;
use crate::events::{EventBus, StoreEvent, Subscription};
use crate::note::{Note, NoteId};
use crate::query::FilterState;
use std::sync::{Arc, RwLock};

/// Progress of the most recently issued list request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListStatus {
    /// The newest list request has not been answered yet.
    pub fetching: bool,
    /// Failure of the newest list request, cleared by the next success.
    pub error: Option<ApiError>,
}

/// Consistent copy of the store contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub notes: Vec<Note>,
    pub filter: FilterState,
    pub status: ListStatus,
}

#[derive(Debug, Default)]
struct StoreState {
    notes: Vec<Note>,
    filter: FilterState,
    status: ListStatus,
    /// Sequence number of the newest list request issued.
    issued_seq: u64,
    /// Sequence number of the last list response applied.
    applied_seq: u64,
}

impl StoreState {
    /// Settle the status if `seq` is the newest request. Returns true when
    /// the status changed.
    fn settle(&mut self, seq: u64, error: Option<ApiError>) -> bool {
        if seq != self.issued_seq {
            return false;
        }
        let status = ListStatus {
            fetching: false,
            error,
        };
        if self.status == status {
            return false;
        }
        self.status = status;
        true
    }
}

/// Authoritative note list plus the filter it was fetched with.
#[derive(Default)]
pub struct NoteStore {
    state: RwLock<StoreState>,
    events: Arc<EventBus>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store starting from a previously used filter.
    pub fn with_filter(filter: FilterState) -> Self {
        Self {
            state: RwLock::new(StoreState {
                filter,
                ..StoreState::default()
            }),
            events: Arc::new(EventBus::new()),
        }
    }

    /// Subscribe to store mutations.
    pub fn subscribe(
        &self,
        callback: impl Fn(&StoreEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.subscribe(callback)
    }

    // ==================== Reads ====================

    pub fn notes(&self) -> Vec<Note> {
        self.read(|s| s.notes.clone())
    }

    pub fn filter(&self) -> FilterState {
        self.read(|s| s.filter.clone())
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.read(|s| StoreSnapshot {
            notes: s.notes.clone(),
            filter: s.filter.clone(),
            status: s.status.clone(),
        })
    }

    pub fn list_status(&self) -> ListStatus {
        self.read(|s| s.status.clone())
    }

    pub fn is_fetching(&self) -> bool {
        self.read(|s| s.status.fetching)
    }

    pub fn get(&self, id: &NoteId) -> Option<Note> {
        self.read(|s| s.notes.iter().find(|n| &n.id == id).cloned())
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.read(|s| s.notes.iter().any(|n| &n.id == id))
    }

    pub fn len(&self) -> usize {
        self.read(|s| s.notes.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ==================== Mutators ====================

    /// Replace the whole list. The list response is the source of truth.
    pub fn replace_all(&self, notes: Vec<Note>) {
        let count = notes.len();
        self.write(|s| s.notes = notes);
        self.events.emit(&StoreEvent::NotesReplaced { count });
    }

    /// Register a new list request and mark the store as fetching.
    /// Returns the request's sequence number.
    pub fn begin_list(&self) -> u64 {
        let (seq, changed, failed) = self.write(|s| {
            s.issued_seq += 1;
            let changed = !s.status.fetching;
            s.status.fetching = true;
            (s.issued_seq, changed, s.status.error.is_some())
        });
        if changed {
            self.emit_status(true, failed);
        }
        seq
    }

    /// Replace the whole list only if `seq` is newer than the last applied
    /// list response. Returns false when the response was stale.
    ///
    /// Fetching ends only when `seq` is the newest request issued.
    pub fn replace_all_sequenced(&self, seq: u64, notes: Vec<Note>) -> bool {
        let count = notes.len();
        let (applied, settled) = self.write(|s| {
            if seq <= s.applied_seq {
                return (false, false);
            }
            s.applied_seq = seq;
            s.notes = notes;
            (true, s.settle(seq, None))
        });
        if applied {
            self.events.emit(&StoreEvent::NotesReplaced { count });
        }
        if settled {
            self.emit_status(false, false);
        }
        applied
    }

    /// Record the failure of list request `seq`. Returns false, leaving the
    /// status untouched, when a newer request has been issued since.
    pub fn fail_list(&self, seq: u64, error: ApiError) -> bool {
        let (current, settled) = self.write(|s| {
            let current = seq == s.issued_seq;
            (current, s.settle(seq, Some(error)))
        });
        if settled {
            self.emit_status(false, true);
        }
        current
    }

    /// Append a note, or replace it in place when its id is already present.
    pub fn append(&self, note: Note) {
        let id = note.id.clone();
        let replaced = self.write(|s| match s.notes.iter_mut().find(|n| n.id == note.id) {
            Some(existing) => {
                *existing = note;
                true
            }
            None => {
                s.notes.push(note);
                false
            }
        });
        let event = if replaced {
            StoreEvent::NoteUpdated { id }
        } else {
            StoreEvent::NoteAdded { id }
        };
        self.events.emit(&event);
    }

    /// Replace the note with the same id at its current position.
    /// Returns false when no such note exists.
    pub fn replace(&self, note: Note) -> bool {
        let id = note.id.clone();
        let found = self.write(|s| match s.notes.iter_mut().find(|n| n.id == note.id) {
            Some(existing) => {
                *existing = note;
                true
            }
            None => false,
        });
        if found {
            self.events.emit(&StoreEvent::NoteUpdated { id });
        }
        found
    }

    /// Remove the note with this id. Returns false when no such note exists.
    pub fn remove(&self, id: &NoteId) -> bool {
        let removed = self.write(|s| {
            let before = s.notes.len();
            s.notes.retain(|n| &n.id != id);
            s.notes.len() != before
        });
        if removed {
            self.events.emit(&StoreEvent::NoteRemoved { id: id.clone() });
        }
        removed
    }

    pub fn replace_filter(&self, filter: FilterState) {
        let changed = self.write(|s| {
            if s.filter == filter {
                return false;
            }
            s.filter = filter;
            true
        });
        if changed {
            self.events.emit(&StoreEvent::FilterChanged);
        }
    }

    fn emit_status(&self, fetching: bool, failed: bool) {
        self.events
            .emit(&StoreEvent::ListStatusChanged { fetching, failed });
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let guard = self.state.read().unwrap_or_else(|e| e.into_inner());
        f(&*guard)
    }

    // Events are emitted after the guard is released so subscribers can read.
    fn write<T>(&self, f: impl FnOnce(&mut StoreState) -> T) -> T {
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        f(&mut *guard)
    }
}
