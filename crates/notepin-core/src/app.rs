//! Application controller
//!
//! [`NotesApp`] owns the storage handle, the note collection, the editor
//! session and the map overlay. Every mutation of the collection goes
//! through one commit path: persist the whole list, roll the in-memory list
//! back when that fails, otherwise rebuild the markers and notify the save
//! observers.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::db::KeyValueStore;
use crate::editor::{wrap_index, Direction, Draft, EditorMode, EditorSession};
use crate::export::{parse_import, render_export, select_new_notes, ImportSummary};
use crate::map::{MapOverlay, Marker, NotePopup};
use crate::media::{check_image_size, prepare_note_image, NoteImage};
use crate::models::{validate_note_text, Location, Note, NoteId};
use crate::render::{self, Counter, GridView, ListItem};
use crate::store::{
    NoteStore, CURRENT_NOTE_KEY, GIST_ID_KEY, GIST_TOKEN_KEY, LAST_SAVED_KEY, MAP_LOCATION_KEY,
};
use crate::sync::{BackupPayload, CloudStatus, GistClient, GistError, GistToken, GistUser};
use crate::util::{non_empty_trimmed, unix_millis_now};
use crate::{Error, Result};

/// Passed to observers after every successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveEvent {
    pub total_notes: usize,
    pub saved_at: DateTime<Utc>,
}

type SaveObserver = Box<dyn Fn(&SaveEvent) + Send + Sync>;

pub struct NotesApp<S> {
    storage: S,
    config: AppConfig,
    store: NoteStore,
    editor: EditorSession,
    map: MapOverlay,
    observers: Vec<SaveObserver>,
}

impl<S: KeyValueStore> NotesApp<S> {
    /// Load the persisted notes and the last editor position.
    ///
    /// Unreadable data degrades to an empty collection; this never fails.
    pub async fn load(storage: S, config: AppConfig) -> Self {
        let store = NoteStore::load(&storage).await;
        let mut map = MapOverlay::new(&config.map);
        map.rebuild(store.notes());

        let mut app = Self {
            storage,
            config,
            store,
            editor: EditorSession::new(),
            map,
            observers: Vec::new(),
        };
        app.restore_position().await;
        app.restore_location().await;
        app
    }

    /// Register a callback run after every successful save
    pub fn on_save<F>(&mut self, observer: F)
    where
        F: Fn(&SaveEvent) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn notes(&self) -> &[Note] {
        self.store.notes()
    }

    pub const fn editor(&self) -> &EditorSession {
        &self.editor
    }

    pub fn note(&self, id: NoteId) -> Result<&Note> {
        self.store.get(id).ok_or_else(|| not_found(id))
    }

    /// Note loaded in the editor, if any
    pub fn current_note(&self) -> Option<&Note> {
        self.editor.current().and_then(|id| self.store.get(id))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.editor.current().and_then(|id| self.store.index_of(id))
    }

    /// Resolve an exact id or a unique id prefix.
    pub fn resolve_id(&self, raw: &str) -> Result<NoteId> {
        let raw = raw.trim();
        if let Ok(id) = raw.parse::<NoteId>() {
            if self.store.contains(id) {
                return Ok(id);
            }
        }

        let matches = self
            .store
            .notes()
            .iter()
            .filter(|note| note.id.to_string().starts_with(raw))
            .map(|note| note.id)
            .collect::<Vec<_>>();
        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(Error::NotFound(raw.to_string())),
            _ => Err(Error::InvalidInput(format!(
                "Note id prefix '{raw}' matches {} notes",
                matches.len()
            ))),
        }
    }

    // Editor

    /// Blank editor for a new note
    pub fn open_new(&mut self) {
        self.editor.open_new();
    }

    /// Load an existing note read-only and remember the position.
    pub async fn open_note(&mut self, id: NoteId) -> Result<&Note> {
        let note = self.store.get(id).ok_or_else(|| not_found(id))?;
        self.editor.open_existing(note);
        self.remember_position().await;
        self.note(id)
    }

    pub fn toggle_edit(&mut self) -> Result<EditorMode> {
        self.editor.toggle()
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        self.editor.set_title(title)
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> Result<()> {
        self.editor.set_content(content)
    }

    /// Compress `bytes` and put the result on the draft.
    ///
    /// On error the draft keeps its previous image.
    pub fn attach_image(&mut self, bytes: &[u8]) -> Result<NoteImage> {
        if !self.editor.is_editing() {
            return Err(read_only());
        }
        let image = prepare_note_image(bytes, &self.config.image)?;
        self.set_image(&image)?;
        Ok(image)
    }

    /// Like [`Self::attach_image`], checking the file size before reading it.
    pub async fn attach_image_file(&mut self, path: &Path) -> Result<NoteImage> {
        if !self.editor.is_editing() {
            return Err(read_only());
        }
        let image = self.load_image_file(path).await?;
        self.set_image(&image)?;
        Ok(image)
    }

    /// Read and compress an image file without touching the draft or the
    /// collection.
    pub async fn load_image_file(&self, path: &Path) -> Result<NoteImage> {
        let metadata = tokio::fs::metadata(path).await?;
        check_image_size(metadata.len(), &self.config.image)?;
        let bytes = tokio::fs::read(path).await?;
        prepare_note_image(&bytes, &self.config.image)
    }

    /// Put an already prepared image on the draft.
    pub fn set_image(&mut self, image: &NoteImage) -> Result<()> {
        self.editor.set_image(Some(image.data_url.clone()))
    }

    pub fn remove_image(&mut self) -> Result<()> {
        self.editor.set_image(None)
    }

    /// Validate and persist the draft.
    ///
    /// A new note goes to the head of the list; an existing one is updated in
    /// place. Either way the editor ends up viewing the saved note.
    pub async fn save_current(&mut self) -> Result<NoteId> {
        if !self.editor.is_editing() {
            return Err(Error::InvalidInput(
                "Nothing to save; switch to edit mode first".to_string(),
            ));
        }
        let Draft {
            title,
            content,
            image,
        } = self.editor.draft().clone();
        let (title, content) = validate_note_text(&title, &content)?;

        let snapshot = self.store.clone();
        let id = match self.editor.current() {
            None => {
                let now = unix_millis_now();
                let id = self.store.next_id(now);
                self.store
                    .add(Note::new(id, title, content, now).with_image(image));
                id
            }
            Some(id) => {
                let note = self.store.get_mut(id).ok_or_else(|| not_found(id))?;
                note.title = title;
                note.content = content;
                note.image = image;
                id
            }
        };
        self.commit(snapshot).await?;

        if let Some(note) = self.store.get(id) {
            self.editor.open_existing(note);
        }
        self.remember_position().await;
        tracing::info!("Saved note {}", id);
        Ok(id)
    }

    /// Copy the draft text into the loaded note and persist it.
    ///
    /// Only runs while editing an existing note. No validation is applied.
    /// Returns whether anything was written.
    pub async fn autosave_tick(&mut self) -> Result<bool> {
        if !self.editor.is_editing() {
            return Ok(false);
        }
        let Some(id) = self.editor.current() else {
            return Ok(false);
        };
        let Some(note) = self.store.get(id) else {
            return Ok(false);
        };
        let draft = self.editor.draft();
        if note.title == draft.title && note.content == draft.content {
            return Ok(false);
        }
        let (title, content) = (draft.title.clone(), draft.content.clone());

        let snapshot = self.store.clone();
        if let Some(note) = self.store.get_mut(id) {
            note.title = title;
            note.content = content;
        }
        self.commit(snapshot).await?;
        self.editor.mark_text_saved();
        tracing::debug!("Autosaved note {}", id);
        Ok(true)
    }

    /// Delete a note. When it was the current one the editor stays on the
    /// same position, clamped to the new end of the list.
    pub async fn delete_note(&mut self, id: NoteId, confirmed: bool) -> Result<Note> {
        let index = self.store.index_of(id).ok_or_else(|| not_found(id))?;
        if !confirmed {
            return Err(Error::ConfirmationRequired(
                "Are you sure you want to delete this note? This action cannot be undone."
                    .to_string(),
            ));
        }

        let snapshot = self.store.clone();
        let removed = self.store.remove(index).ok_or_else(|| not_found(id))?;
        self.commit(snapshot).await?;

        if self.editor.current() == Some(id) {
            match self.store.len() {
                0 => self.editor.reset(),
                len => {
                    if let Some(note) = self.store.at(index.min(len - 1)) {
                        self.editor.open_existing(note);
                    }
                }
            }
            self.remember_position().await;
        }
        tracing::info!("Deleted note {}", id);
        Ok(removed)
    }

    pub async fn delete_current(&mut self, confirmed: bool) -> Result<Note> {
        let id = self
            .editor
            .current()
            .ok_or_else(|| Error::InvalidInput("No note selected to delete".to_string()))?;
        self.delete_note(id, confirmed).await
    }

    /// Remove every note; returns how many were removed.
    pub async fn clear_all(&mut self, confirmed: bool) -> Result<usize> {
        if self.store.is_empty() {
            return Err(Error::Validation("No notes to remove.".to_string()));
        }
        if !confirmed {
            return Err(Error::ConfirmationRequired(
                "This will delete ALL notes permanently. This cannot be undone!".to_string(),
            ));
        }

        let removed = self.store.len();
        let snapshot = self.store.clone();
        self.store.clear();
        self.commit(snapshot).await?;
        self.editor.reset();
        self.remember_position().await;
        tracing::info!("Removed all {} notes", removed);
        Ok(removed)
    }

    /// Move to the previous/next note, wrapping at both ends.
    ///
    /// Refuses with [`Error::UnsavedChanges`] while the draft is dirty unless
    /// `discard` is set. Returns `None` when there are no notes.
    pub async fn navigate(&mut self, direction: Direction, discard: bool) -> Result<Option<NoteId>> {
        if self.editor.is_dirty() && !discard {
            return Err(Error::UnsavedChanges);
        }
        let Some(index) = wrap_index(self.current_index(), self.store.len(), direction) else {
            return Ok(None);
        };
        let Some(note) = self.store.at(index) else {
            return Ok(None);
        };
        let id = note.id;
        self.editor.open_existing(note);
        self.remember_position().await;
        Ok(Some(id))
    }

    // Views

    pub fn grid(&self) -> GridView {
        render::grid(self.store.notes())
    }

    pub fn list(&self) -> Vec<ListItem> {
        render::list(self.store.notes(), self.editor.current())
    }

    pub fn counter(&self) -> Counter {
        render::counter(self.store.notes(), self.editor.current())
    }

    // Map

    pub fn map(&self) -> Result<&MapOverlay> {
        self.require_map()?;
        Ok(&self.map)
    }

    pub fn markers(&self) -> Result<&[Marker]> {
        self.require_map()?;
        Ok(self.map.markers())
    }

    /// Record the device location used by [`Self::add_note_here`].
    pub async fn set_current_location(&mut self, location: Location) -> Result<()> {
        self.require_map()?;
        self.map.set_current_location(location);
        let raw = serde_json::to_string(&location)?;
        self.storage.set(MAP_LOCATION_KEY, &raw).await
    }

    /// Create a pinned note at `location`.
    pub async fn add_note_at(
        &mut self,
        location: Location,
        title: &str,
        content: &str,
    ) -> Result<NoteId> {
        self.add_note_at_with_image(location, title, content, None)
            .await
    }

    /// Create a pinned note carrying a prepared image in the same save.
    pub async fn add_note_at_with_image(
        &mut self,
        location: Location,
        title: &str,
        content: &str,
        image: Option<&NoteImage>,
    ) -> Result<NoteId> {
        self.require_map()?;
        let (title, content) = validate_note_text(title, content)?;

        let snapshot = self.store.clone();
        let now = unix_millis_now();
        let id = self.store.next_id(now);
        let note = Note::new(id, title, content, now)
            .with_location(location)
            .with_image(image.map(|image| image.data_url.clone()));
        self.store.add(note);
        self.commit(snapshot).await?;
        tracing::info!("Saved note {} at {}", id, location);
        Ok(id)
    }

    /// Create a pinned note at the recorded current location.
    pub async fn add_note_here(&mut self, title: &str, content: &str) -> Result<NoteId> {
        self.require_map()?;
        let location = self.map.current_location().ok_or_else(|| {
            Error::Validation("Please enable location services first.".to_string())
        })?;
        self.add_note_at(location, title, content).await
    }

    /// Popup for the marker of `id`; unpinned notes have none.
    pub fn popup(&self, id: NoteId) -> Result<NotePopup> {
        Ok(NotePopup::from_note(self.pinned_note(id)?))
    }

    /// Load the pinned note in the editor, ready for [`Self::toggle_edit`].
    pub async fn edit_from_popup(&mut self, id: NoteId) -> Result<&Note> {
        self.pinned_note(id)?;
        self.open_note(id).await
    }

    pub async fn delete_from_popup(&mut self, id: NoteId, confirmed: bool) -> Result<Note> {
        self.pinned_note(id)?;
        if !confirmed {
            return Err(Error::ConfirmationRequired("Delete this note?".to_string()));
        }
        self.delete_note(id, true).await
    }

    // Export / import

    pub fn export_json(&self) -> Result<String> {
        self.require_cloud()?;
        Ok(render_export(self.store.notes(), Utc::now())?)
    }

    /// Append the notes of an export document whose ids are new.
    pub async fn import_json(&mut self, raw: &str) -> Result<ImportSummary> {
        self.require_cloud()?;
        let incoming = parse_import(raw)?;
        let (accepted, summary) = select_new_notes(self.store.notes(), incoming);
        if accepted.is_empty() {
            return Ok(summary);
        }

        let snapshot = self.store.clone();
        self.store.extend(accepted);
        self.commit(snapshot).await?;
        tracing::info!(
            "Imported {} notes ({} skipped)",
            summary.imported,
            summary.skipped
        );
        Ok(summary)
    }

    // Cloud

    /// Validate `token` against the user endpoint, then store it.
    pub async fn cloud_login(&mut self, token: &str) -> Result<GistUser> {
        self.require_cloud()?;
        let token = GistToken::new(token)?;
        let client = GistClient::new(&self.config.cloud, token.clone())?;
        let user = client.current_user().await?;
        self.storage.set(GIST_TOKEN_KEY, token.expose()).await?;
        tracing::info!("Stored gist token for {}", user.login);
        Ok(user)
    }

    /// Forget the stored credential and the remote document id
    pub async fn cloud_logout(&mut self) -> Result<()> {
        self.require_cloud()?;
        self.storage.remove(GIST_TOKEN_KEY).await?;
        self.storage.remove(GIST_ID_KEY).await?;
        Ok(())
    }

    pub async fn cloud_status(&self) -> Result<CloudStatus> {
        Ok(CloudStatus {
            enabled: self.config.features.cloud,
            logged_in: self.stored_value(GIST_TOKEN_KEY).await?.is_some(),
            gist_id: self.stored_value(GIST_ID_KEY).await?,
            last_saved: self.stored_value(LAST_SAVED_KEY).await?,
        })
    }

    /// Upload the collection, creating the remote document on first use.
    /// Returns the remote document id.
    pub async fn backup_to_cloud(&self) -> Result<String> {
        self.require_cloud()?;
        let client = self.cloud_client().await?;
        let payload = BackupPayload::new(self.store.notes(), Utc::now());

        if let Some(gist_id) = self.stored_value(GIST_ID_KEY).await? {
            client.update_backup(&gist_id, &payload).await?;
            return Ok(gist_id);
        }
        let gist_id = client.create_backup(&payload).await?;
        self.storage.set(GIST_ID_KEY, &gist_id).await?;
        Ok(gist_id)
    }

    /// Replace the whole local collection with the remote backup.
    pub async fn restore_from_cloud(&mut self, confirmed: bool) -> Result<usize> {
        self.require_cloud()?;
        let client = self.cloud_client().await?;
        let gist_id = self.stored_value(GIST_ID_KEY).await?.ok_or_else(|| {
            Error::Validation("No cloud backup found. Back up your notes first.".to_string())
        })?;
        if !confirmed {
            return Err(Error::ConfirmationRequired(
                "This will replace all local notes with the cloud backup.".to_string(),
            ));
        }

        let payload = client.fetch_backup(&gist_id).await?;
        let (notes, _) = select_new_notes(&[], payload.notes);

        let snapshot = self.store.clone();
        self.store.replace(notes);
        self.commit(snapshot).await?;

        match self.editor.current().and_then(|id| self.store.get(id)) {
            Some(note) => self.editor.open_existing(note),
            None => self.editor.reset(),
        }
        self.remember_position().await;
        tracing::info!("Restored {} notes from gist {}", self.store.len(), gist_id);
        Ok(self.store.len())
    }

    async fn cloud_client(&self) -> Result<GistClient> {
        let token = self
            .stored_value(GIST_TOKEN_KEY)
            .await?
            .ok_or(GistError::NotConfigured)?;
        Ok(GistClient::new(&self.config.cloud, GistToken::new(token)?)?)
    }

    async fn stored_value(&self, key: &str) -> Result<Option<String>> {
        Ok(self.storage.get(key).await?.as_deref().and_then(non_empty_trimmed))
    }

    fn pinned_note(&self, id: NoteId) -> Result<&Note> {
        self.require_map()?;
        let marker = self.map.marker(id).ok_or_else(|| not_found(id))?;
        self.note(marker.note_id)
    }

    fn require_map(&self) -> Result<()> {
        if self.config.features.map {
            Ok(())
        } else {
            Err(Error::FeatureDisabled("map"))
        }
    }

    fn require_cloud(&self) -> Result<()> {
        if self.config.features.cloud {
            Ok(())
        } else {
            Err(Error::FeatureDisabled("cloud"))
        }
    }

    async fn commit(&mut self, snapshot: NoteStore) -> Result<()> {
        if let Err(error) = self.store.save(&self.storage).await {
            tracing::error!("Error saving notes: {}", error);
            self.store = snapshot;
            return Err(error);
        }

        self.map.rebuild(self.store.notes());
        let event = SaveEvent {
            total_notes: self.store.len(),
            saved_at: Utc::now(),
        };
        for observer in &self.observers {
            observer(&event);
        }
        Ok(())
    }

    async fn remember_position(&self) {
        let result = match self.editor.current() {
            Some(id) => self.storage.set(CURRENT_NOTE_KEY, &id.to_string()).await,
            None => self.storage.remove(CURRENT_NOTE_KEY).await,
        };
        if let Err(error) = result {
            tracing::warn!("Failed to remember current note: {}", error);
        }
    }

    async fn restore_position(&mut self) {
        let raw = match self.storage.get(CURRENT_NOTE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(error) => {
                tracing::warn!("Failed to read current note: {}", error);
                return;
            }
        };
        match raw.parse::<NoteId>() {
            Ok(id) => {
                if let Some(note) = self.store.get(id) {
                    self.editor.open_existing(note);
                }
            }
            Err(error) => tracing::warn!("Ignoring invalid current note id {:?}: {}", raw, error),
        }
    }

    async fn restore_location(&mut self) {
        match self.storage.get(MAP_LOCATION_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Location>(&raw) {
                Ok(location) => self.map.set_current_location(location),
                Err(error) => tracing::warn!("Ignoring invalid map location: {}", error),
            },
            Ok(None) => {}
            Err(error) => tracing::warn!("Failed to read map location: {}", error),
        }
    }
}

fn not_found(id: NoteId) -> Error {
    Error::NotFound(id.to_string())
}

fn read_only() -> Error {
    Error::InvalidInput("Note is read-only; switch to edit mode first".to_string())
}
