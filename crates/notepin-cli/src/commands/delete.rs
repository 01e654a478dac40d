use crate::commands::common::{confirm, open_app, resolve_note_id, Context};
use crate::error::CliError;

pub async fn run_delete(
    id: Option<&str>,
    assume_yes: bool,
    context: &Context,
) -> Result<(), CliError> {
    let mut app = open_app(context).await?;
    let id = id.map(|id| resolve_note_id(&app, id)).transpose()?;

    let confirmed = assume_yes
        || confirm("Are you sure you want to delete this note? This action cannot be undone.")?;
    let removed = match id {
        Some(id) => app.delete_note(id, confirmed).await?,
        None => app.delete_current(confirmed).await?,
    };

    println!("{}", removed.id);
    Ok(())
}

pub async fn run_clear(assume_yes: bool, context: &Context) -> Result<(), CliError> {
    let mut app = open_app(context).await?;

    let confirmed = assume_yes
        || app.notes().is_empty()
        || confirm("WARNING: This will delete ALL notes permanently. Are you sure?")?;
    let removed = app.clear_all(confirmed).await?;

    println!("All {removed} notes have been deleted.");
    Ok(())
}
