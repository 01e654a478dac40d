use std::env;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use notepin_core::db::Database;
use notepin_core::map::{Marker, NotePopup, Viewport};
use notepin_core::render::{GridView, ListItem, EMPTY_STATE_MESSAGE};
use notepin_core::{AppConfig, LocalStorage, Note, NoteId, NotesApp};
use serde::Serialize;

use crate::error::CliError;

pub type App = NotesApp<LocalStorage>;

/// Paths and configuration shared by every command
pub struct Context {
    pub db_path: PathBuf,
    pub config_path: PathBuf,
    pub config: AppConfig,
}

#[derive(Debug, Serialize)]
pub struct MarkerItem {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub title: String,
}

impl From<&Marker> for MarkerItem {
    fn from(marker: &Marker) -> Self {
        Self {
            id: marker.note_id.to_string(),
            lat: marker.location.lat,
            lng: marker.location.lng,
            title: marker.title.clone(),
        }
    }
}

pub async fn open_app(context: &Context) -> Result<App, CliError> {
    if let Some(parent) = context.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::open(&context.db_path).await?;
    let storage = LocalStorage::new(db, context.config.storage.quota_bytes);
    let mut app = NotesApp::load(storage, context.config.clone()).await;
    app.on_save(|event| {
        tracing::debug!(
            "Saved {} notes at {}",
            event.total_notes,
            event.saved_at.to_rfc3339()
        );
    });
    Ok(app)
}

pub fn resolve_note_id(app: &App, id: &str) -> Result<NoteId, CliError> {
    let normalized = normalize_note_identifier(id)?;
    Ok(app.resolve_id(&normalized)?)
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Content from the arguments, falling back to piped stdin.
pub fn resolve_note_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

/// Ask a yes/no question on the terminal; non-interactive runs answer no.
pub fn confirm(prompt: &str) -> Result<bool, CliError> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Ok(false);
    }

    let mut stderr = io::stderr();
    write!(stderr, "{prompt} [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub fn format_list_lines(items: &[ListItem]) -> Vec<String> {
    if items.is_empty() {
        return vec!["No notes".to_string()];
    }
    items
        .iter()
        .map(|item| {
            let marker = if item.active { '>' } else { ' ' };
            format!(
                "{marker} {:<13}  {:<24}  {:<12}  {}",
                item.id,
                truncate(&item.title, 24),
                item.date,
                item.excerpt.replace('\n', " ")
            )
        })
        .collect()
}

pub fn format_grid_lines(view: &GridView) -> Vec<String> {
    match view {
        GridView::Empty => vec![EMPTY_STATE_MESSAGE.to_string()],
        GridView::Cards(cards) => cards
            .iter()
            .map(|card| {
                let image = if card.has_image { "[img]" } else { "     " };
                format!("{image} {}  {}  ({})", card.id, card.title, card.date)
            })
            .collect(),
    }
}

pub fn format_note(note: &Note, counter: &str) -> Vec<String> {
    let mut lines = vec![
        format!("{}  [{counter}]", note.title),
        format!("{}  {}", note.id, note.date),
    ];
    if let Some(location) = note.location.as_ref() {
        lines.push(location.label());
    }
    if note.has_image() {
        lines.push("[image attached]".to_string());
    }
    lines.push(String::new());
    lines.push(note.content.clone());
    lines
}

pub fn format_popup(popup: &NotePopup) -> Vec<String> {
    let mut lines = vec![popup.title.clone(), popup.content.clone()];
    lines.extend(popup.location_label.clone());
    lines.extend(popup.created_label.clone());
    lines
}

pub fn format_viewport(viewport: &Viewport) -> String {
    format!("Map centered at {} (zoom {})", viewport.center, viewport.zoom)
}

pub fn format_marker_lines(markers: &[Marker]) -> Vec<String> {
    markers
        .iter()
        .map(|marker| {
            format!(
                "{:<13}  {:<22}  {}",
                marker.note_id,
                marker.location.to_string(),
                marker.title
            )
        })
        .collect()
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let mut truncated = value
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

/// Text written to the editor temp file: title, blank line, content.
pub fn render_editor_buffer(title: &str, content: &str) -> String {
    format!("{title}\n\n{content}\n")
}

/// Inverse of [`render_editor_buffer`]; the first line is the title.
pub fn parse_editor_buffer(raw: &str) -> (String, String) {
    match raw.split_once('\n') {
        Some((title, content)) => (title.trim().to_string(), content.trim().to_string()),
        None => (raw.trim().to_string(), String::new()),
    }
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let mut command = Command::new(program);
            command.args(parts).arg(file_path);

            let status = command.status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("notepin-note-{}-{now}.txt", std::process::id()))
}

/// Best-effort removal of an editor temp file.
pub fn discard_temp_file(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!("Failed to remove editor file {}: {}", path.display(), error);
            false
        }
    }
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match cli_db_path.or_else(|| env::var_os("NOTEPIN_DB_PATH").map(PathBuf::from)) {
        Some(path) => Ok(path),
        None => default_db_path(),
    }
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("notepin").join("notepin.db"))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI data directory".to_string()))
}
