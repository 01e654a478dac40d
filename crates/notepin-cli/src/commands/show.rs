use notepin_core::editor::Direction;

use crate::commands::common::{format_note, open_app, resolve_note_id, App, Context};
use crate::error::CliError;

pub async fn run_show(id: &str, context: &Context) -> Result<(), CliError> {
    let mut app = open_app(context).await?;
    let id = resolve_note_id(&app, id)?;
    app.open_note(id).await?;
    print_current(&app);
    Ok(())
}

pub async fn run_navigate(direction: Direction, context: &Context) -> Result<(), CliError> {
    let mut app = open_app(context).await?;
    if app.navigate(direction, false).await?.is_none() {
        println!("No notes");
        return Ok(());
    }
    print_current(&app);
    Ok(())
}

fn print_current(app: &App) {
    if let Some(note) = app.current_note() {
        for line in format_note(note, &app.counter().to_string()) {
            println!("{line}");
        }
    }
}
