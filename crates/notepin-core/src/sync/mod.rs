//! Cloud backup to a private gist.
//!
//! A backup overwrites a single JSON file in one gist. The gist id is
//! remembered after the first backup so later backups update in place.
//! Restoring replaces the whole local collection with the remote one.

mod gist;

pub use gist::{GistClient, GistError, GistResult, GistToken, GistUser};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::export::EXPORT_VERSION;
use crate::models::Note;

/// Content of the backup file stored in the gist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupPayload {
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub total_notes: Option<usize>,
}

impl BackupPayload {
    #[must_use]
    pub fn new(notes: &[Note], updated_at: DateTime<Utc>) -> Self {
        Self {
            notes: notes.to_vec(),
            version: Some(EXPORT_VERSION.to_string()),
            last_updated: Some(updated_at.to_rfc3339()),
            total_notes: Some(notes.len()),
        }
    }
}

/// Snapshot of the cloud backup configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudStatus {
    pub enabled: bool,
    pub logged_in: bool,
    pub gist_id: Option<String>,
    pub last_saved: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteId;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn payload_uses_camel_case_fields() {
        let notes = vec![Note::new(NoteId::from_millis(7), "t", "c", 7)];
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let value = serde_json::to_value(BackupPayload::new(&notes, at)).unwrap();

        assert_eq!(value["totalNotes"], 1);
        assert_eq!(value["lastUpdated"], "2026-01-02T03:04:05+00:00");
        assert_eq!(value["version"], "1.0");
    }

    #[test]
    fn payload_without_notes_reads_as_empty() {
        let payload: BackupPayload = serde_json::from_str(r#"{"version":"1.0"}"#).unwrap();
        assert!(payload.notes.is_empty());
    }
}
