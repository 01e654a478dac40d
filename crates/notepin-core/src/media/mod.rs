//! Image attachments for notes.

mod attachment;

pub use attachment::{check_image_size, prepare_note_image, NoteImage};
