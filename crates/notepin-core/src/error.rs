//! Error types for notepin-core

use thiserror::Error;

use crate::sync::GistError;

/// Result type alias using notepin-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in notepin-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Note not found
    #[error("Note not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A note failed validation before save
    #[error("{0}")]
    Validation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local storage is full
    #[error("Failed to save notes. Your storage might be full ({required} of {quota} bytes).")]
    QuotaExceeded { required: usize, quota: usize },

    /// Attached image is over the configured ceiling
    #[error("Image is too large ({size} bytes, max {limit} bytes). Please choose a smaller image.")]
    ImageTooLarge { size: u64, limit: u64 },

    /// Image decoding or encoding failed
    #[error("Image error: {0}")]
    Image(String),

    /// The operation belongs to a feature that is switched off
    #[error("The {0} feature is disabled")]
    FeatureDisabled(&'static str),

    /// The editor holds draft changes that would be lost
    #[error("The current note has unsaved changes; save them or discard them first")]
    UnsavedChanges,

    /// A destructive operation was attempted without confirmation
    #[error("Confirmation required: {0}")]
    ConfirmationRequired(String),

    /// Cloud backup error
    #[error(transparent)]
    Cloud(#[from] GistError),
}
