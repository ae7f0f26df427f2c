//! Application facade wiring the sync client to search input and alerts.
//!
//! A UI shell talks to `NotesApp` only:
//! - search keystrokes go through the debouncer, then re-list the notes
//! - category and sorter changes re-list immediately
//! - edits and deletes go through the edit session and the sync client
//!
//! Dropping the app cancels the pending search and stops the search pump.

use crate::alerts::AlertEmitter;
use crate::config::Config;
use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::http::HttpNotesApi;
use notes_core::sync::Result;
use notes_core::{
    AlertSink, ApiError, CategoryFilter, DeleteOutcome, FieldLimits, FilterState, ListOutcome,
    Note, NoteDraft, NoteStore, NoteSync, NotesApi, Sorter,
};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct NotesApp<A: NotesApi + 'static> {
    sync: Arc<NoteSync<A>>,
    alerts: Arc<AlertEmitter>,
    search: Mutex<Debouncer<String>>,
    pump: JoinHandle<()>,
}

impl NotesApp<HttpNotesApi> {
    /// Build an app talking to the configured note service.
    pub fn connect(config: &Config) -> std::result::Result<Self, ApiError> {
        let api = HttpNotesApi::from_config(config)?;
        Ok(Self::new(api, config.limits))
    }
}

impl<A: NotesApi + 'static> NotesApp<A> {
    /// Must be called from within a tokio runtime.
    pub fn new(api: A, limits: FieldLimits) -> Self {
        Self::with_store(api, Arc::new(NoteStore::new()), limits)
    }

    /// Same as `new`, sharing an existing store (and its last filter).
    pub fn with_store(api: A, store: Arc<NoteStore>, limits: FieldLimits) -> Self {
        let alerts = Arc::new(AlertEmitter::new());
        let sync = Arc::new(NoteSync::new(
            Arc::new(api),
            store,
            Arc::clone(&alerts) as Arc<dyn AlertSink>,
            limits,
        ));

        let (debouncer, search_rx) = Debouncer::new(SEARCH_DEBOUNCE);
        let pump = tokio::spawn(Self::search_pump(Arc::clone(&sync), search_rx));

        Self {
            sync,
            alerts,
            search: Mutex::new(debouncer),
            pump,
        }
    }

    /// Turns each debounced search value into a list request.
    async fn search_pump(sync: Arc<NoteSync<A>>, mut search_rx: mpsc::UnboundedReceiver<String>) {
        while let Some(search) = search_rx.recv().await {
            let filter = FilterState {
                search,
                ..sync.store().filter()
            };
            // Failures are already logged and alerted by the sync client.
            if let Err(e) = sync.list(filter).await {
                debug!("Search list failed: {}", e);
            }
        }
    }

    pub fn sync(&self) -> &Arc<NoteSync<A>> {
        &self.sync
    }

    pub fn store(&self) -> &Arc<NoteStore> {
        self.sync.store()
    }

    pub fn alerts(&self) -> &AlertEmitter {
        &self.alerts
    }

    // ==================== Filter input ====================

    /// Raw search text as typed; propagated once typing pauses.
    pub fn on_search_text(&self, raw: &str) {
        self.search
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(raw.to_string());
    }

    pub async fn select_category(&self, category: CategoryFilter) -> Result<ListOutcome> {
        let filter = self.store().filter().with_category(category);
        self.sync.list(filter).await
    }

    pub async fn select_sorter(&self, sorter: Sorter) -> Result<ListOutcome> {
        let filter = self.store().filter().with_sorter(sorter);
        self.sync.list(filter).await
    }

    pub async fn refresh(&self) -> Result<ListOutcome> {
        self.sync.refresh().await
    }

    // ==================== Editing ====================

    pub fn select_for_edit(&self, note: &Note) {
        self.sync.session().select_existing(note);
    }

    pub fn select_add(&self) {
        self.sync.session().select_new();
    }

    pub fn discard_edit(&self) {
        self.sync.session().discard();
    }

    /// Save the open editor: the note being edited is updated, the add
    /// editor creates. Returns `Ok(None)` when no editor is open.
    pub async fn save_editor(&self) -> Result<Option<Note>> {
        self.sync.save_editor().await
    }

    pub async fn save(&self, draft: NoteDraft) -> Result<Note> {
        self.sync.save(draft).await
    }

    pub async fn delete(
        &self,
        note: &Note,
        confirm: impl FnOnce(&Note) -> bool,
    ) -> Result<DeleteOutcome> {
        self.sync.delete(note, confirm).await
    }
}

impl<A: NotesApi + 'static> Drop for NotesApp<A> {
    fn drop(&mut self) {
        self.search
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .cancel();
        self.pump.abort();
    }
}
