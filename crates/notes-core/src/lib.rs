//! notes-core: client-side note synchronization.
//!
//! This crate provides the runtime-agnostic pieces of the notes client:
//! - The note model, validation and the field editor
//! - The filter state and the list query it maps to
//! - The shared note store and its change events
//! - Edit-session tracking and alert state
//! - The `NotesApi` transport trait and the `NoteSync` orchestrator

pub mod alert;
pub mod api;
pub mod events;
pub mod note;
pub mod query;
pub mod session;
pub mod store;
pub mod sync;

pub use alert::{AlertEvent, AlertKind, AlertSink, AlertState, AlertTicket};
pub use api::{ApiError, ApiRequest, MemoryNotesApi, NotesApi};
pub use events::{EventBus, StoreEvent, Subscription};
pub use note::{
    Category, FieldLimits, Note, NoteDraft, NoteEditor, NoteField, NoteId, ValidationError,
};
pub use query::{build_query, CategoryFilter, FilterState, Sorter};
pub use session::{EditSession, EditTarget};
pub use store::{ListStatus, NoteStore, StoreSnapshot};
pub use sync::{DeleteOutcome, ListOutcome, NoteSync, SyncError};
