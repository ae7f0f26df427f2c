//! NoteSync: reconciles the shared store with the remote note service.
//!
//! The store is never mutated on a guess. Every mutation happens only
//! after the server has confirmed the operation, and the store then takes
//! the server's copy of the note:
//!
//! 1. `list` persists the filter, fetches, and replaces the whole list
//! 2. `create` appends the server's copy of the new note
//! 3. `update` replaces the note in place with the server's copy
//! 4. `delete` asks for confirmation, then removes the note by id
//!
//! Failures leave the store untouched, are logged, raise an error alert and
//! are returned to the caller. Nothing is retried automatically.
//!
//! List requests are numbered by the store; a response that arrives after
//! a newer one has already been applied is discarded, and a failure of a
//! request that has since been superseded is returned without an alert.
//!
//! Saving an open editor follows the edit target, not store membership: an
//! existing note is always updated (and fails as not found once it has left
//! the store), the add editor always creates.

use crate::alert::{AlertEvent, AlertSink};
use crate::api::{ApiError, NotesApi};
use crate::note::{FieldLimits, Note, NoteDraft, NoteId, ValidationError};
use crate::query::{build_query, FilterState};
use crate::session::{EditSession, EditTarget};
use crate::store::NoteStore;

use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Invalid note: {0}")]
    Validation(#[from] ValidationError),

    #[error("Remote call failed: {0}")]
    Api(#[from] ApiError),

    #[error("Note not found: {0}")]
    NotFound(NoteId),
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Result of a successful list call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOutcome {
    /// The store now holds this many notes.
    Applied(usize),
    /// A newer list response had already been applied; this one was dropped.
    Stale,
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined the confirmation; no request was sent.
    Declined,
}

/// Remote sync client bound to one store and one edit session.
pub struct NoteSync<A: NotesApi> {
    api: Arc<A>,
    store: Arc<NoteStore>,
    session: Mutex<EditSession>,
    alerts: Arc<dyn AlertSink>,
}

impl<A: NotesApi> NoteSync<A> {
    pub fn new(
        api: Arc<A>,
        store: Arc<NoteStore>,
        alerts: Arc<dyn AlertSink>,
        limits: FieldLimits,
    ) -> Self {
        Self {
            api,
            store,
            session: Mutex::new(EditSession::new(limits)),
            alerts,
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn store(&self) -> &Arc<NoteStore> {
        &self.store
    }

    /// Lock the edit session. Do not hold the guard across an await.
    pub fn session(&self) -> MutexGuard<'_, EditSession> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fetch the notes matching `filter` and make it the active filter.
    pub async fn list(&self, filter: FilterState) -> Result<ListOutcome> {
        let query = build_query(&filter);
        self.store.replace_filter(filter);

        let seq = self.store.begin_list();
        debug!("Listing notes (request {}): {}", seq, query);

        match self.api.list(&query).await {
            Ok(notes) => {
                let count = notes.len();
                if self.store.replace_all_sequenced(seq, notes) {
                    debug!("Applied list response {} ({} notes)", seq, count);
                    Ok(ListOutcome::Applied(count))
                } else {
                    debug!("Discarding stale list response {}", seq);
                    Ok(ListOutcome::Stale)
                }
            }
            Err(e) => {
                if self.store.fail_list(seq, e.clone()) {
                    Err(self.fail("list", e.into()))
                } else {
                    debug!("List request {} superseded before it failed: {}", seq, e);
                    Err(e.into())
                }
            }
        }
    }

    /// Re-fetch with the store's current filter.
    pub async fn refresh(&self) -> Result<ListOutcome> {
        self.list(self.store.filter()).await
    }

    /// Save whatever the open editor holds. Returns `Ok(None)` when no editor
    /// is open. Blank fields are flagged on the editor and block the save.
    pub async fn save_editor(&self) -> Result<Option<Note>> {
        let (existing, draft) = {
            let mut session = self.session();
            let existing = match session.target() {
                EditTarget::EditingExisting(id) => Some(id.clone()),
                EditTarget::EditingNew | EditTarget::Idle => None,
            };
            let Some(editor) = session.editor_mut() else {
                return Ok(None);
            };
            editor.validate()?;
            (existing, editor.to_draft())
        };
        self.save_to(existing, draft).await.map(Some)
    }

    /// Save a draft: update when it is the note being edited or a note in
    /// the store, create otherwise.
    pub async fn save(&self, draft: NoteDraft) -> Result<Note> {
        let existing = draft
            .id
            .clone()
            .filter(|id| self.session().is_editing(id) || self.store.contains(id));
        self.save_to(existing, draft).await
    }

    async fn save_to(&self, existing: Option<NoteId>, draft: NoteDraft) -> Result<Note> {
        match existing {
            Some(id) => {
                let note = Note {
                    id,
                    title: draft.title,
                    description: draft.description,
                    category: draft.category,
                    date: draft.date,
                };
                self.update(note).await
            }
            None => self.create(draft).await,
        }
    }

    /// Create a note. The edit session stays open on failure so input is kept.
    pub async fn create(&self, draft: NoteDraft) -> Result<Note> {
        draft.validate()?;

        match self.api.create(&draft).await {
            Ok(note) => {
                info!("Created note {}", note.id);
                self.store.append(note.clone());
                self.session().close();
                self.alerts.emit(AlertEvent::saved());
                Ok(note)
            }
            Err(e) => Err(self.fail("create", e.into())),
        }
    }

    /// Update a note that is already in the store.
    pub async fn update(&self, note: Note) -> Result<Note> {
        note.validate()?;

        if !self.store.contains(&note.id) {
            return Err(self.fail("update", SyncError::NotFound(note.id)));
        }

        match self.api.update(&note).await {
            Ok(updated) => {
                info!("Updated note {}", updated.id);
                if !self.store.replace(updated.clone()) {
                    warn!("Note {} left the store before its update was confirmed", updated.id);
                }
                self.session().close();
                self.alerts.emit(AlertEvent::saved());
                Ok(updated)
            }
            Err(e) => Err(self.fail("update", e.into())),
        }
    }

    /// Delete a note. `confirm` must approve before any request is sent.
    pub async fn delete(
        &self,
        note: &Note,
        confirm: impl FnOnce(&Note) -> bool,
    ) -> Result<DeleteOutcome> {
        if !confirm(note) {
            debug!("Delete of note {} declined", note.id);
            return Ok(DeleteOutcome::Declined);
        }

        if !self.store.contains(&note.id) {
            return Err(self.fail("delete", SyncError::NotFound(note.id.clone())));
        }

        match self.api.delete(&note.id).await {
            Ok(()) => {
                info!("Deleted note {}", note.id);
                self.store.remove(&note.id);
                self.alerts.emit(AlertEvent::deleted());
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => Err(self.fail("delete", e.into())),
        }
    }

    fn fail(&self, operation: &str, err: SyncError) -> SyncError {
        error!("Failed to {} note(s): {}", operation, err);
        self.alerts.emit(AlertEvent::error());
        err
    }
}
