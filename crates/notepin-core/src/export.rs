//! JSON export/import of the whole note collection.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Note, NoteId};
use crate::Result;

/// Format version written into exports and backups.
pub const EXPORT_VERSION: &str = "1.0";

/// Document written by `export` and read by `import`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub export_date: Option<String>,
    #[serde(default)]
    pub total_notes: Option<usize>,
}

impl ExportDocument {
    /// Snapshot `notes` with export metadata.
    #[must_use]
    pub fn new(notes: &[Note], exported_at: DateTime<Utc>) -> Self {
        Self {
            notes: notes.to_vec(),
            version: Some(EXPORT_VERSION.to_string()),
            export_date: Some(exported_at.to_rfc3339()),
            total_notes: Some(notes.len()),
        }
    }
}

/// Outcome of merging an import into the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Render notes as a pretty-printed export document.
pub fn render_export(notes: &[Note], exported_at: DateTime<Utc>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ExportDocument::new(notes, exported_at))
}

/// Parse an export document; a missing `notes` field reads as empty.
pub fn parse_import(raw: &str) -> Result<Vec<Note>> {
    let document: ExportDocument = serde_json::from_str(raw)?;
    Ok(document.notes)
}

/// Keep only the incoming notes whose ids are not already in `existing`.
///
/// Duplicates inside `incoming` are also dropped after their first
/// occurrence. Field-level differences are never reconciled.
#[must_use]
pub fn select_new_notes(existing: &[Note], incoming: Vec<Note>) -> (Vec<Note>, ImportSummary) {
    let mut seen = existing.iter().map(|note| note.id).collect::<HashSet<NoteId>>();
    let mut summary = ImportSummary::default();
    let mut accepted = Vec::new();

    for note in incoming {
        if seen.insert(note.id) {
            summary.imported += 1;
            accepted.push(note);
        } else {
            summary.skipped += 1;
        }
    }

    (accepted, summary)
}

/// Build a default file name for export downloads.
#[must_use]
pub fn suggested_export_file_name(exported_at: DateTime<Utc>) -> String {
    format!("notes-backup-{}.json", exported_at.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn note(id: i64, title: &str) -> Note {
        Note::new(NoteId::from_millis(id), title, "body", id)
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[test]
    fn render_export_includes_metadata() {
        let rendered = render_export(&[note(1, "a"), note(2, "b")], fixed_time()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["version"], "1.0");
        assert_eq!(value["totalNotes"], 2);
        assert_eq!(value["exportDate"], "2026-10-19T12:00:00+00:00");
        assert_eq!(value["notes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn parse_import_tolerates_missing_notes() {
        assert!(parse_import(r#"{"version":"1.0"}"#).unwrap().is_empty());
        assert!(parse_import("not json").is_err());
    }

    #[test]
    fn export_then_import_reproduces_collection() {
        let notes = vec![note(3, "c"), note(2, "b"), note(1, "a")];
        let rendered = render_export(&notes, fixed_time()).unwrap();

        let (accepted, summary) = select_new_notes(&[], parse_import(&rendered).unwrap());
        assert_eq!(accepted, notes);
        assert_eq!(
            summary,
            ImportSummary {
                imported: 3,
                skipped: 0
            }
        );
    }

    #[test]
    fn select_new_notes_skips_existing_and_repeated_ids() {
        let existing = vec![note(1, "original")];
        let incoming = vec![note(1, "changed"), note(2, "new"), note(2, "new again")];

        let (accepted, summary) = select_new_notes(&existing, incoming);
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].title, "new");
        assert_eq!(summary.skipped, 2);
    }

    #[test]
    fn suggested_file_name_uses_date() {
        assert_eq!(
            suggested_export_file_name(fixed_time()),
            "notes-backup-2026-10-19.json"
        );
    }
}
