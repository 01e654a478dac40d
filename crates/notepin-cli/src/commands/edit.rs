use std::path::{Path, PathBuf};
use std::time::Duration;

use notepin_core::NoteId;

use crate::commands::common::{
    create_temp_note_file_path, discard_temp_file, launch_editor, open_app, parse_editor_buffer,
    preferred_editor, render_editor_buffer, resolve_note_id, App, Context,
};
use crate::error::CliError;

/// Field changes requested on the command line
#[derive(Debug, Default)]
pub struct EditFlags {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<PathBuf>,
    pub remove_image: bool,
}

impl EditFlags {
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.image.is_none() && !self.remove_image
    }
}

pub async fn run_edit(id: &str, flags: EditFlags, context: &Context) -> Result<(), CliError> {
    let mut app = open_app(context).await?;
    let id = resolve_note_id(&app, id)?;
    app.open_note(id).await?;

    let saved = edit_loaded_note(&mut app, flags, context).await?;
    println!("{saved}");
    Ok(())
}

/// Switch the loaded note to editing, apply `flags` (or open `$EDITOR` when
/// there are none) and save.
pub async fn edit_loaded_note(
    app: &mut App,
    flags: EditFlags,
    context: &Context,
) -> Result<NoteId, CliError> {
    app.toggle_edit()?;

    if flags.is_empty() {
        edit_in_editor(app, context.config.autosave_interval_secs).await?;
    } else {
        apply_flags(app, flags).await?;
    }

    Ok(app.save_current().await?)
}

pub async fn apply_flags(app: &mut App, flags: EditFlags) -> Result<(), CliError> {
    if let Some(title) = flags.title {
        app.set_title(title)?;
    }
    if let Some(content) = flags.content {
        app.set_content(content)?;
    }
    if flags.remove_image {
        app.remove_image()?;
    }
    if let Some(path) = flags.image {
        app.attach_image_file(&path).await?;
    }
    Ok(())
}

/// Open the note in `$EDITOR`, autosaving the buffer every
/// `autosave_secs` until the editor exits.
async fn edit_in_editor(app: &mut App, autosave_secs: u64) -> Result<(), CliError> {
    let (id, buffer) = match app.current_note() {
        Some(note) => (note.id, render_editor_buffer(&note.title, &note.content)),
        None => return Err(CliError::EmptyNoteId),
    };

    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, buffer)?;

    let editor = preferred_editor();
    let editor_path = temp_file.clone();
    let mut session = tokio::task::spawn_blocking(move || launch_editor(&editor, &editor_path));

    let period = Duration::from_secs(autosave_secs.max(1));
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    let launch_result = loop {
        tokio::select! {
            result = &mut session => break result,
            _ = ticker.tick() => autosave_from_file(app, id, &temp_file).await,
        }
    };

    let edited = std::fs::read_to_string(&temp_file);
    discard_temp_file(&temp_file);
    launch_result.map_err(|error| CliError::EditorFailed(error.to_string()))??;

    let (title, content) = parse_editor_buffer(&edited?);
    app.set_title(title)?;
    app.set_content(content)?;
    Ok(())
}

async fn autosave_from_file(app: &mut App, id: NoteId, path: &Path) {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!("Autosave could not read {}: {}", path.display(), error);
            return;
        }
    };
    let (title, content) = parse_editor_buffer(&raw);
    let result = async {
        app.set_title(title)?;
        app.set_content(content)?;
        app.autosave_tick().await
    }
    .await;

    match result {
        Ok(true) => tracing::info!("Autosaved note {}", id),
        Ok(false) => {}
        Err(error) => tracing::warn!("Autosave failed: {}", error),
    }
}
