//! Editor state machine
//!
//! The editor is either viewing a note (fields read-only) or editing one
//! (fields writable). Opening a new note starts in editing, opening an
//! existing note starts in viewing, and a successful save always lands on
//! viewing the saved note.

use crate::models::{Note, NoteId};
use crate::{Error, Result};

/// Whether the editor fields are writable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Viewing,
    Editing,
}

/// Direction for prev/next navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Field values currently shown in the editor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
}

impl From<&Note> for Draft {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            image: note.image.clone(),
        }
    }
}

/// Editor panel state: mode, loaded note and draft fields
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    mode: EditorMode,
    current: Option<NoteId>,
    draft: Draft,
    baseline: Draft,
}

impl EditorSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank draft for a note that does not exist yet
    pub fn open_new(&mut self) {
        self.current = None;
        self.draft = Draft::default();
        self.baseline = Draft::default();
        self.mode = EditorMode::Editing;
    }

    /// Load `note` read-only
    pub fn open_existing(&mut self, note: &Note) {
        self.current = Some(note.id);
        self.draft = Draft::from(note);
        self.baseline = self.draft.clone();
        self.mode = EditorMode::Viewing;
    }

    /// Flip between viewing and editing the loaded note
    pub fn toggle(&mut self) -> Result<EditorMode> {
        if self.current.is_none() {
            return Err(Error::InvalidInput("No note selected to edit".to_string()));
        }
        self.mode = match self.mode {
            EditorMode::Viewing => EditorMode::Editing,
            EditorMode::Editing => EditorMode::Viewing,
        };
        Ok(self.mode)
    }

    /// Back to the empty state with nothing loaded
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        self.require_editing()?;
        self.draft.title = title.into();
        Ok(())
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> Result<()> {
        self.require_editing()?;
        self.draft.content = content.into();
        Ok(())
    }

    pub fn set_image(&mut self, image: Option<String>) -> Result<()> {
        self.require_editing()?;
        self.draft.image = image;
        Ok(())
    }

    /// Treat the draft title and content as persisted (autosave)
    pub fn mark_text_saved(&mut self) {
        self.baseline.title.clone_from(&self.draft.title);
        self.baseline.content.clone_from(&self.draft.content);
    }

    /// Whether the draft differs from what was loaded
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.mode == EditorMode::Editing && self.draft != self.baseline
    }

    #[must_use]
    pub const fn mode(&self) -> EditorMode {
        self.mode
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.mode == EditorMode::Editing
    }

    /// Id of the loaded note; `None` while drafting a new note or when empty
    #[must_use]
    pub const fn current(&self) -> Option<NoteId> {
        self.current
    }

    #[must_use]
    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    fn require_editing(&self) -> Result<()> {
        if self.is_editing() {
            Ok(())
        } else {
            Err(Error::InvalidInput(
                "Note is read-only; switch to edit mode first".to_string(),
            ))
        }
    }
}

/// Circular step from `current` over a list of `len` items.
///
/// With no current position, `Next` starts at the head and `Previous` at the
/// tail. Returns `None` for an empty list.
#[must_use]
pub const fn wrap_index(current: Option<usize>, len: usize, direction: Direction) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let next = match (current, direction) {
        (None, Direction::Next) => 0,
        (None, Direction::Previous) => len - 1,
        (Some(index), Direction::Next) => (index + 1) % len,
        (Some(index), Direction::Previous) => (index + len - 1) % len,
    };
    Some(next)
}
