//! View models derived from the note list.
//!
//! Front ends re-render these after every mutation; nothing here holds state.

use serde::Serialize;

use crate::models::{Note, NoteId};

/// Characters of content shown in a list item before `...`
pub const LIST_EXCERPT_CHARS: usize = 50;

/// Text shown when there are no notes
pub const EMPTY_STATE_MESSAGE: &str = "No notes yet. Create your first note to get started.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCard {
    pub id: NoteId,
    pub title: String,
    pub date: String,
    pub has_image: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub id: NoteId,
    pub title: String,
    pub excerpt: String,
    pub date: String,
    pub active: bool,
}

/// "current / total"; `current` is 1-based and 0 when nothing is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counter {
    pub current: usize,
    pub total: usize,
}

impl std::fmt::Display for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.current, self.total)
    }
}

/// Home grid: either cards or the empty state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridView {
    Empty,
    Cards(Vec<GridCard>),
}

#[must_use]
pub fn grid(notes: &[Note]) -> GridView {
    if notes.is_empty() {
        return GridView::Empty;
    }
    GridView::Cards(
        notes
            .iter()
            .map(|note| GridCard {
                id: note.id,
                title: note.title.clone(),
                date: note.date.clone(),
                has_image: note.has_image(),
            })
            .collect(),
    )
}

#[must_use]
pub fn list(notes: &[Note], current: Option<NoteId>) -> Vec<ListItem> {
    notes
        .iter()
        .map(|note| ListItem {
            id: note.id,
            title: note.title.clone(),
            excerpt: note.excerpt(LIST_EXCERPT_CHARS),
            date: note.date.clone(),
            active: Some(note.id) == current,
        })
        .collect()
}

#[must_use]
pub fn counter(notes: &[Note], current: Option<NoteId>) -> Counter {
    let position = current
        .and_then(|id| notes.iter().position(|note| note.id == id))
        .map_or(0, |index| index + 1);
    Counter {
        current: position,
        total: notes.len(),
    }
}
