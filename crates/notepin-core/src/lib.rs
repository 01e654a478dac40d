//! notepin-core - Core library for Notepin
//!
//! This crate contains the note model, the local storage layer, the editor
//! state machine, the image pipeline, the map overlay, gist backups and the
//! application controller used by the Notepin front ends.

pub mod app;
pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod export;
pub mod map;
pub mod media;
pub mod models;
pub mod render;
pub mod store;
pub mod sync;
pub mod util;

pub use app::{NotesApp, SaveEvent};
pub use config::{AppConfig, Features};
pub use db::{KeyValueStore, LocalStorage, MemoryStorage};
pub use error::{Error, Result};
pub use models::{Location, Note, NoteId};
