//! `NotesApi` trait for talking to the remote note service.
//!
//! Implementations:
//! - `MemoryNotesApi` - In-process server, for tests and offline use
//! - `HttpNotesApi` (in notes-client) - REST over reqwest

use crate::note::{Note, NoteDraft, NoteId};
use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{method} {url} returned status {status}")]
    Status {
        method: String,
        url: String,
        status: u16,
    },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// The four note endpoints of the remote service.
#[async_trait]
pub trait NotesApi: Send + Sync {
    /// `GET /notes?{query}`, notes in server order.
    async fn list(&self, query: &str) -> Result<Vec<Note>>;

    /// `POST /notes`, returns the note as stored by the server.
    async fn create(&self, draft: &NoteDraft) -> Result<Note>;

    /// `PUT /notes/{id}` with every field except the id.
    async fn update(&self, note: &Note) -> Result<Note>;

    /// `DELETE /notes/{id}`.
    async fn delete(&self, id: &NoteId) -> Result<()>;
}

/// A request received by `MemoryNotesApi`, recorded in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    List(String),
    Create(Option<NoteId>),
    Update(NoteId),
    Delete(NoteId),
}

#[derive(Default)]
struct MemoryState {
    notes: Vec<Note>,
    requests: Vec<ApiRequest>,
    failures_pending: usize,
}

/// In-memory note service that honors the same query parameters as the
/// remote one (`q`, `category`, `_sort=date`, `_order`).
#[derive(Default)]
pub struct MemoryNotesApi {
    state: Mutex<MemoryState>,
}

impl MemoryNotesApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                notes,
                ..MemoryState::default()
            }),
        }
    }

    /// Make the next `count` requests fail with status 500.
    pub fn fail_next(&self, count: usize) {
        self.lock().failures_pending = count;
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    /// Notes as currently stored server-side.
    pub fn stored(&self) -> Vec<Note> {
        self.lock().notes.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the request and consume an injected failure, if any.
    fn begin(state: &mut MemoryState, request: ApiRequest, method: &str, url: String) -> Result<()> {
        state.requests.push(request);
        if state.failures_pending > 0 {
            state.failures_pending -= 1;
            return Err(ApiError::Status {
                method: method.to_string(),
                url,
                status: 500,
            });
        }
        Ok(())
    }

    fn not_found(method: &str, id: &NoteId) -> ApiError {
        ApiError::Status {
            method: method.to_string(),
            url: format!("/notes/{}", id),
            status: 404,
        }
    }
}

#[async_trait]
impl NotesApi for MemoryNotesApi {
    async fn list(&self, query: &str) -> Result<Vec<Note>> {
        let mut state = self.lock();
        Self::begin(
            &mut state,
            ApiRequest::List(query.to_string()),
            "GET",
            format!("/notes?{}", query),
        )?;

        let mut search = None;
        let mut category = None;
        let mut descending = false;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "q" => search = Some(value.to_lowercase()),
                "category" => category = Some(value.into_owned()),
                "_order" => descending = value == "desc",
                _ => {}
            }
        }

        let mut notes: Vec<Note> = state
            .notes
            .iter()
            .filter(|n| category.as_deref().is_none_or(|c| n.category.as_str() == c))
            .filter(|n| {
                search.as_deref().is_none_or(|q| {
                    n.title.to_lowercase().contains(q) || n.description.to_lowercase().contains(q)
                })
            })
            .cloned()
            .collect();

        notes.sort_by_key(|n| n.date);
        if descending {
            notes.reverse();
        }
        Ok(notes)
    }

    async fn create(&self, draft: &NoteDraft) -> Result<Note> {
        let mut state = self.lock();
        Self::begin(
            &mut state,
            ApiRequest::Create(draft.id.clone()),
            "POST",
            "/notes".to_string(),
        )?;

        let id = draft.id.clone().unwrap_or_else(NoteId::generate);
        if state.notes.iter().any(|n| n.id == id) {
            return Err(ApiError::Status {
                method: "POST".to_string(),
                url: "/notes".to_string(),
                status: 500,
            });
        }

        let note = Note {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            category: draft.category,
            date: draft.date,
        };
        state.notes.push(note.clone());
        Ok(note)
    }

    async fn update(&self, note: &Note) -> Result<Note> {
        let mut state = self.lock();
        Self::begin(
            &mut state,
            ApiRequest::Update(note.id.clone()),
            "PUT",
            format!("/notes/{}", note.id),
        )?;

        match state.notes.iter_mut().find(|n| n.id == note.id) {
            Some(existing) => {
                *existing = note.clone();
                Ok(note.clone())
            }
            None => Err(Self::not_found("PUT", &note.id)),
        }
    }

    async fn delete(&self, id: &NoteId) -> Result<()> {
        let mut state = self.lock();
        Self::begin(
            &mut state,
            ApiRequest::Delete(id.clone()),
            "DELETE",
            format!("/notes/{}", id),
        )?;

        let before = state.notes.len();
        state.notes.retain(|n| &n.id != id);
        if state.notes.len() == before {
            return Err(Self::not_found("DELETE", id));
        }
        Ok(())
    }
}
