use notepin_core::Location;

use crate::cli::MapCommands;
use crate::commands::common::{
    confirm, format_marker_lines, format_popup, format_viewport, open_app, resolve_note_content,
    resolve_note_id, Context, MarkerItem,
};
use crate::commands::edit::{edit_loaded_note, EditFlags};
use crate::error::CliError;

pub async fn run_map(command: MapCommands, context: &Context) -> Result<(), CliError> {
    match command {
        MapCommands::Markers { json } => run_markers(json, context).await,
        MapCommands::Add {
            title,
            content,
            lat,
            lng,
        } => run_map_add(&title, &content, lat.zip(lng), context).await,
        MapCommands::Locate { lat, lng } => run_locate(lat, lng, context).await,
        MapCommands::Popup { id } => run_popup(&id, context).await,
        MapCommands::Edit {
            id,
            title,
            content,
            image,
            remove_image,
        } => {
            let flags = EditFlags {
                title,
                content,
                image,
                remove_image,
            };
            run_map_edit(&id, flags, context).await
        }
        MapCommands::Delete { id, yes } => run_map_delete(&id, yes, context).await,
    }
}

async fn run_markers(as_json: bool, context: &Context) -> Result<(), CliError> {
    let app = open_app(context).await?;
    let map = app.map()?;
    let markers = map.markers();

    if as_json {
        let items = markers.iter().map(MarkerItem::from).collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    println!("{}", format_viewport(&map.viewport()));
    if markers.is_empty() {
        println!("No pinned notes");
    } else {
        for line in format_marker_lines(markers) {
            println!("{line}");
        }
    }
    Ok(())
}

async fn run_map_add(
    title: &str,
    content_parts: &[String],
    location: Option<(f64, f64)>,
    context: &Context,
) -> Result<(), CliError> {
    let content = resolve_note_content(content_parts)?;
    let mut app = open_app(context).await?;

    let id = match location {
        Some((lat, lng)) => {
            app.add_note_at(Location::new(lat, lng)?, title, &content)
                .await?
        }
        None => app.add_note_here(title, &content).await?,
    };

    let note = app.note(id)?;
    println!("{id}");
    if let Some(location) = note.location.as_ref() {
        println!("Note saved at location! {}", location.label());
    }
    Ok(())
}

async fn run_locate(lat: f64, lng: f64, context: &Context) -> Result<(), CliError> {
    let location = Location::new(lat, lng)?;
    let mut app = open_app(context).await?;
    app.set_current_location(location).await?;
    println!("{}", location.label());
    Ok(())
}

async fn run_popup(id: &str, context: &Context) -> Result<(), CliError> {
    let app = open_app(context).await?;
    let id = resolve_note_id(&app, id)?;
    for line in format_popup(&app.popup(id)?) {
        println!("{line}");
    }
    Ok(())
}

async fn run_map_edit(id: &str, flags: EditFlags, context: &Context) -> Result<(), CliError> {
    let mut app = open_app(context).await?;
    let id = resolve_note_id(&app, id)?;
    app.edit_from_popup(id).await?;

    let saved = edit_loaded_note(&mut app, flags, context).await?;
    println!("{saved}");
    Ok(())
}

async fn run_map_delete(id: &str, assume_yes: bool, context: &Context) -> Result<(), CliError> {
    let mut app = open_app(context).await?;
    let id = resolve_note_id(&app, id)?;
    let confirmed = assume_yes || confirm("Delete this note?")?;
    let removed = app.delete_from_popup(id, confirmed).await?;
    println!("{}", removed.id);
    Ok(())
}
