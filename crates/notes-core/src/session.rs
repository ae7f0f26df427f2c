//! Edit-session tracking: which single note, if any, is open for editing.
//!
//! Selecting a new target while already editing silently discards the
//! previous target and its unsaved input. There is no save-protection
//! across switches.

use crate::note::{FieldLimits, Note, NoteEditor, NoteId};

/// What the edit session currently targets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditTarget {
    #[default]
    Idle,
    EditingExisting(NoteId),
    EditingNew,
}

/// Tracks the single active editor.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    target: EditTarget,
    editor: Option<NoteEditor>,
    limits: FieldLimits,
}

impl EditSession {
    pub fn new(limits: FieldLimits) -> Self {
        Self {
            target: EditTarget::Idle,
            editor: None,
            limits,
        }
    }

    pub fn target(&self) -> &EditTarget {
        &self.target
    }

    pub fn is_idle(&self) -> bool {
        self.target == EditTarget::Idle
    }

    pub fn is_editing(&self, id: &NoteId) -> bool {
        matches!(&self.target, EditTarget::EditingExisting(current) if current == id)
    }

    pub fn is_adding(&self) -> bool {
        self.target == EditTarget::EditingNew
    }

    pub fn editor(&self) -> Option<&NoteEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut NoteEditor> {
        self.editor.as_mut()
    }

    /// Open an existing note for editing.
    pub fn select_existing(&mut self, note: &Note) -> &mut NoteEditor {
        self.target = EditTarget::EditingExisting(note.id.clone());
        self.editor.insert(NoteEditor::for_note(note, self.limits))
    }

    /// Open the "add note" editor.
    pub fn select_new(&mut self) -> &mut NoteEditor {
        self.target = EditTarget::EditingNew;
        self.editor.insert(NoteEditor::new(self.limits))
    }

    /// Drop the editor without saving.
    pub fn discard(&mut self) {
        self.target = EditTarget::Idle;
        self.editor = None;
    }

    /// Close after a confirmed save.
    pub fn close(&mut self) {
        self.discard();
    }
}
