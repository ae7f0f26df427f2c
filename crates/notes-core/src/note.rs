//! Note entity model, validation and the field editor.
//!
//! A `Note` is what the server returns and what the store holds. A
//! `NoteDraft` is what the client sends when saving; it only becomes a
//! `Note` once the server has confirmed it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default maximum title length, in characters.
pub const DEFAULT_TITLE_LIMIT: usize = 20;

/// Default maximum description length, in characters.
pub const DEFAULT_DESCRIPTION_LIMIT: usize = 200;

/// Stable identifier of a note. The only key used for lookup, update and delete.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh client-side id (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Workflow category of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    New,
    #[serde(rename = "In progress")]
    InProgress,
    Completed,
    Archived,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::New,
        Category::InProgress,
        Category::Completed,
        Category::Archived,
    ];

    /// Value used on the wire, both in JSON bodies and in list queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::New => "New",
            Category::InProgress => "In progress",
            Category::Completed => "Completed",
            Category::Archived => "Archived",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A note as confirmed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub date: DateTime<Utc>,
}

impl Note {
    /// Confirmation prompt shown before a delete is issued.
    pub fn delete_prompt(&self) -> String {
        format!("Delete note {}?", self.title)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank(&self.title, &self.description)
    }

    /// Body of an update request: every field except the id.
    pub fn fields(&self) -> NoteFields<'_> {
        NoteFields {
            title: &self.title,
            description: &self.description,
            category: self.category,
            date: self.date,
        }
    }
}

/// Borrowed note fields without the id, serialized as the body of `PUT /notes/{id}`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NoteFields<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub category: Category,
    pub date: DateTime<Utc>,
}

/// Input for a save. The id is optional; when present it is either a
/// client-assigned UUID for a new note or the id of an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NoteId>,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub date: DateTime<Utc>,
}

impl NoteDraft {
    /// New draft with a pre-assigned UUID and the current timestamp.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            id: Some(NoteId::generate()),
            title: title.into(),
            description: description.into(),
            category,
            date: Utc::now(),
        }
    }

    /// Check that neither title nor description is blank after trimming.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank(&self.title, &self.description)
    }

    /// Convert into a note, if the draft carries an id.
    pub fn into_note(self) -> Option<Note> {
        let id = self.id?;
        Some(Note {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            date: self.date,
        })
    }
}

impl From<Note> for NoteDraft {
    fn from(note: Note) -> Self {
        Self {
            id: Some(note.id),
            title: note.title,
            description: note.description,
            category: note.category,
            date: note.date,
        }
    }
}

/// Editable note field, used to flag inline validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteField {
    Title,
    Description,
}

impl fmt::Display for NoteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteField::Title => f.write_str("title"),
            NoteField::Description => f.write_str("description"),
        }
    }
}

/// A save was blocked locally because required fields are blank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("required field(s) blank: {}", join_fields(.fields))]
pub struct ValidationError {
    pub fields: Vec<NoteField>,
}

impl ValidationError {
    pub fn has(&self, field: NoteField) -> bool {
        self.fields.contains(&field)
    }
}

fn check_not_blank(title: &str, description: &str) -> Result<(), ValidationError> {
    let mut fields = Vec::new();
    if title.trim().is_empty() {
        fields.push(NoteField::Title);
    }
    if description.trim().is_empty() {
        fields.push(NoteField::Description);
    }
    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { fields })
    }
}

fn join_fields(fields: &[NoteField]) -> String {
    fields
        .iter()
        .map(NoteField::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Character limits for the editable text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLimits {
    pub title: usize,
    pub description: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE_LIMIT,
            description: DEFAULT_DESCRIPTION_LIMIT,
        }
    }
}

/// Form state for a note being edited or added.
///
/// Title input stops accepting characters at the limit. Description input
/// is truncated to the limit. Error flags track blank fields for inline
/// display and never produce alerts.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEditor {
    id: NoteId,
    title: String,
    description: String,
    category: Category,
    title_error: bool,
    description_error: bool,
    limits: FieldLimits,
}

impl NoteEditor {
    /// Empty editor for a new note. The id is assigned up front so that
    /// retried saves of the same draft carry the same id.
    pub fn new(limits: FieldLimits) -> Self {
        Self {
            id: NoteId::generate(),
            title: String::new(),
            description: String::new(),
            category: Category::default(),
            title_error: false,
            description_error: false,
            limits,
        }
    }

    /// Editor prefilled from an existing note.
    pub fn for_note(note: &Note, limits: FieldLimits) -> Self {
        Self {
            id: note.id.clone(),
            title: note.title.clone(),
            description: note.description.clone(),
            category: note.category,
            title_error: false,
            description_error: false,
            limits,
        }
    }

    pub fn id(&self) -> &NoteId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn title_error(&self) -> bool {
        self.title_error
    }

    pub fn description_error(&self) -> bool {
        self.description_error
    }

    pub fn limits(&self) -> FieldLimits {
        self.limits
    }

    /// Returns false when the input was rejected for exceeding the limit.
    pub fn set_title(&mut self, raw: &str) -> bool {
        if raw.chars().count() > self.limits.title {
            return false;
        }
        self.title = raw.to_string();
        self.title_error = self.title.trim().is_empty();
        true
    }

    pub fn set_description(&mut self, raw: &str) {
        self.description = truncate_chars(raw, self.limits.description);
        self.description_error = self.description.trim().is_empty();
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    pub fn description_chars_left(&self) -> usize {
        self.limits
            .description
            .saturating_sub(self.description.chars().count())
    }

    /// Flag blank fields; the returned error lists every offending field.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        let result = check_not_blank(&self.title, &self.description);
        if let Err(err) = &result {
            self.title_error |= err.has(NoteField::Title);
            self.description_error |= err.has(NoteField::Description);
        }
        result
    }

    /// Draft to hand to the sync client, stamped with the current time.
    pub fn to_draft(&self) -> NoteDraft {
        NoteDraft {
            id: Some(self.id.clone()),
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category,
            date: Utc::now(),
        }
    }
}

fn truncate_chars(value: &str, limit: usize) -> String {
    match value.char_indices().nth(limit) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value.to_string(),
    }
}
