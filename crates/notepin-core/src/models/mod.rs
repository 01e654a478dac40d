//! Data models for Notepin

mod location;
mod note;

pub use location::Location;
pub use note::{display_date, validate_note_text, Note, NoteId};
