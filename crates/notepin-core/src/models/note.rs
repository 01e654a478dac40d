//! Note model

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use super::Location;
use crate::{Error, Result};

/// A unique identifier for a note, taken from its creation time (Unix ms)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(i64);

impl NoteId {
    /// Wrap a raw millisecond timestamp as an id
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Raw millisecond value of this id
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A note in the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Title shown on cards and list items
    pub title: String,
    /// Plain text body
    pub content: String,
    /// Compressed image as an embedded data URI
    #[serde(default)]
    pub image: Option<String>,
    /// Human readable creation date, e.g. "Oct 19, 2026"
    #[serde(default)]
    pub date: String,
    /// Creation timestamp (Unix ms)
    #[serde(default)]
    pub timestamp: i64,
    /// Pin position for notes created from the map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Note {
    /// Create a note whose id and timestamp are both `timestamp_ms`
    #[must_use]
    pub fn new(
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
        timestamp_ms: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            image: None,
            date: display_date(timestamp_ms),
            timestamp: timestamp_ms,
            location: None,
        }
    }

    /// Attach an image data URI
    #[must_use]
    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    /// Attach a map location
    #[must_use]
    pub const fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// First `max_chars` characters of the content, with `...` when truncated
    #[must_use]
    pub fn excerpt(&self, max_chars: usize) -> String {
        if self.content.chars().count() <= max_chars {
            self.content.clone()
        } else {
            let mut excerpt = self.content.chars().take(max_chars).collect::<String>();
            excerpt.push_str("...");
            excerpt
        }
    }

    /// Whether an image is attached
    #[must_use]
    pub const fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// Format a Unix ms timestamp the way note cards display dates ("Oct 19, 2026").
#[must_use]
pub fn display_date(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map_or_else(String::new, |date| date.format("%b %-d, %Y").to_string())
}

/// Trim a title/content pair and reject it when either part is empty.
pub fn validate_note_text(title: &str, content: &str) -> Result<(String, String)> {
    let title = title.trim();
    let content = content.trim();
    if title.is_empty() || content.is_empty() {
        return Err(Error::Validation(
            "Please enter both title and content for the note.".to_string(),
        ));
    }
    Ok((title.to_string(), content.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_id_parse() {
        let id = NoteId::from_millis(1_729_000_000_000);
        let parsed: NoteId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("abc".parse::<NoteId>().is_err());
    }

    #[test]
    fn test_note_new() {
        let note = Note::new(NoteId::from_millis(1000), "Groceries", "Milk", 1000);
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.timestamp, 1000);
        assert!(!note.date.is_empty());
        assert!(note.image.is_none());
        assert!(note.location.is_none());
    }

    #[test]
    fn test_excerpt_truncates_with_ellipsis() {
        let note = Note::new(NoteId::from_millis(1), "t", "a".repeat(60), 1);
        let excerpt = note.excerpt(50);
        assert_eq!(excerpt.len(), 53);
        assert!(excerpt.ends_with("..."));

        let short = Note::new(NoteId::from_millis(2), "t", "short", 2);
        assert_eq!(short.excerpt(50), "short");
    }

    #[test]
    fn test_validate_note_text() {
        assert!(validate_note_text("  ", "body").is_err());
        assert!(validate_note_text("title", "\n").is_err());
        assert_eq!(
            validate_note_text(" title ", " body ").unwrap(),
            ("title".to_string(), "body".to_string())
        );
    }

    #[test]
    fn test_deserialize_legacy_shape() {
        let raw = r#"{"id":1700000000000,"title":"Old","content":"Saved by the web app","image":null,"date":"Nov 14, 2023","timestamp":1700000000000}"#;
        let note: Note = serde_json::from_str(raw).unwrap();
        assert_eq!(note.id, NoteId::from_millis(1_700_000_000_000));
        assert!(note.location.is_none());

        let serialized = serde_json::to_string(&note).unwrap();
        assert!(!serialized.contains("location"));
        assert!(serialized.contains("\"image\":null"));
    }
}
