//! In-memory note collection mirrored to local storage
//!
//! The [`NoteStore`] list is the only mutable copy of the notes. Storage holds
//! a serialized mirror that is rewritten in full on every [`NoteStore::save`].
//! List operations never persist on their own; callers save right after.

use chrono::Utc;

use crate::db::KeyValueStore;
use crate::models::{Note, NoteId};
use crate::Result;

/// Key holding the JSON notes array
pub const NOTES_KEY: &str = "notes";
/// Key holding the RFC 3339 time of the last successful save
pub const LAST_SAVED_KEY: &str = "notes_last_saved";
/// Key holding the cloud backup credential
pub const GIST_TOKEN_KEY: &str = "gist_token";
/// Key holding the remote backup document id
pub const GIST_ID_KEY: &str = "gist_id";
/// Key holding the id the editor was last positioned on
pub const CURRENT_NOTE_KEY: &str = "current_note";
/// Key holding the last known "current location" for the map
pub const MAP_LOCATION_KEY: &str = "map_location";

/// Ordered note collection, most recently created first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteStore {
    notes: Vec<Note>,
}

impl NoteStore {
    /// Build a store from an existing list
    #[must_use]
    pub const fn from_notes(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    /// Read the persisted notes.
    ///
    /// Missing data yields an empty store. Corrupted data is logged and also
    /// yields an empty store; this never fails.
    pub async fn load<S: KeyValueStore>(storage: &S) -> Self {
        let raw = match storage.get(NOTES_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(error) => {
                tracing::error!("Error reading notes from storage: {}", error);
                return Self::default();
            }
        };

        match serde_json::from_str::<Vec<Note>>(&raw) {
            Ok(notes) => {
                tracing::info!("Loaded {} notes from storage", notes.len());
                Self { notes }
            }
            Err(error) => {
                tracing::error!("Error loading notes: {}", error);
                Self::default()
            }
        }
    }

    /// Serialize the whole list into storage and stamp the save time.
    pub async fn save<S: KeyValueStore>(&self, storage: &S) -> Result<()> {
        let serialized = serde_json::to_string(&self.notes)?;
        storage.set(NOTES_KEY, &serialized).await?;
        if let Err(error) = storage
            .set(LAST_SAVED_KEY, &Utc::now().to_rfc3339())
            .await
        {
            tracing::warn!("Failed to record last save time: {}", error);
        }
        tracing::debug!("Saved {} notes to storage", self.notes.len());
        Ok(())
    }

    /// Insert a note at the head of the list
    pub fn add(&mut self, note: Note) {
        self.notes.insert(0, note);
    }

    /// Append notes after the existing ones
    pub fn extend(&mut self, notes: impl IntoIterator<Item = Note>) {
        self.notes.extend(notes);
    }

    /// Replace the note at `index`; returns `false` when out of range
    pub fn update(&mut self, index: usize, note: Note) -> bool {
        match self.notes.get_mut(index) {
            Some(slot) => {
                *slot = note;
                true
            }
            None => false,
        }
    }

    /// Remove and return the note at `index`
    pub fn remove(&mut self, index: usize) -> Option<Note> {
        (index < self.notes.len()).then(|| self.notes.remove(index))
    }

    /// Drop every note
    pub fn clear(&mut self) {
        self.notes.clear();
    }

    /// Replace the whole collection
    pub fn replace(&mut self, notes: Vec<Note>) {
        self.notes = notes;
    }

    /// Position of the note with `id`
    #[must_use]
    pub fn index_of(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    /// Note with `id`
    #[must_use]
    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Mutable note with `id`
    pub fn get_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| note.id == id)
    }

    /// Note at `index`
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    /// Whether a note with `id` exists
    #[must_use]
    pub fn contains(&self, id: NoteId) -> bool {
        self.index_of(id).is_some()
    }

    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// An id derived from `now_ms` that no note in the store uses yet.
    #[must_use]
    pub fn next_id(&self, now_ms: i64) -> NoteId {
        let newest = self
            .notes
            .iter()
            .map(|note| note.id.as_millis())
            .max()
            .unwrap_or(i64::MIN);
        if now_ms > newest {
            NoteId::from_millis(now_ms)
        } else {
            NoteId::from_millis(newest.saturating_add(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;
    use crate::Error;
    use pretty_assertions::assert_eq;

    fn note(id: i64, title: &str) -> Note {
        Note::new(NoteId::from_millis(id), title, format!("{title} body"), id)
    }

    #[test]
    fn add_prepends() {
        let mut store = NoteStore::default();
        store.add(note(1, "first"));
        store.add(note(2, "second"));
        assert_eq!(store.at(0).unwrap().title, "second");
        assert_eq!(store.at(1).unwrap().title, "first");
    }

    #[test]
    fn update_remove_and_clear() {
        let mut store = NoteStore::from_notes(vec![note(2, "b"), note(1, "a")]);

        assert!(store.update(1, note(1, "a2")));
        assert!(!store.update(5, note(9, "nope")));
        assert_eq!(store.at(1).unwrap().title, "a2");

        assert_eq!(store.remove(0).unwrap().title, "b");
        assert!(store.remove(3).is_none());
        assert_eq!(store.len(), 1);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn next_id_never_collides() {
        let store = NoteStore::from_notes(vec![note(100, "a"), note(50, "b")]);
        assert_eq!(store.next_id(200), NoteId::from_millis(200));
        assert_eq!(store.next_id(100), NoteId::from_millis(101));
        assert_eq!(store.next_id(10), NoteId::from_millis(101));
    }

    #[tokio::test]
    async fn save_then_load_roundtrip() {
        let storage = MemoryStorage::default();
        let store = NoteStore::from_notes(vec![note(2, "b"), note(1, "a")]);
        store.save(&storage).await.unwrap();

        let loaded = NoteStore::load(&storage).await;
        assert_eq!(loaded, store);
        assert!(storage.get(LAST_SAVED_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn load_corrupted_data_yields_empty_store() {
        let storage = MemoryStorage::default();
        storage.set(NOTES_KEY, "{not json").await.unwrap();

        let loaded = NoteStore::load(&storage).await;
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn save_over_quota_fails_and_keeps_previous_mirror() {
        let storage = MemoryStorage::new(400);
        let store = NoteStore::from_notes(vec![note(1, "a")]);
        store.save(&storage).await.unwrap();
        let before = storage.get(NOTES_KEY).await.unwrap();

        let mut big = store.clone();
        big.add(Note::new(NoteId::from_millis(2), "big", "x".repeat(1000), 2));
        let err = big.save(&storage).await.unwrap_err();

        assert!(matches!(err, Error::QuotaExceeded { .. }));
        assert_eq!(storage.get(NOTES_KEY).await.unwrap(), before);
    }
}
