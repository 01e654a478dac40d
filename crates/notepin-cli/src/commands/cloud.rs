use std::env;

use crate::cli::CloudCommands;
use crate::commands::common::{confirm, normalize_content, open_app, read_piped_stdin, Context};
use crate::error::CliError;

pub async fn run_cloud(command: CloudCommands, context: &Context) -> Result<(), CliError> {
    match command {
        CloudCommands::Login { token } => run_login(token, context).await,
        CloudCommands::Logout => run_logout(context).await,
        CloudCommands::Status => run_status(context).await,
        CloudCommands::Backup => run_backup(context).await,
        CloudCommands::Restore { yes } => run_restore(yes, context).await,
    }
}

/// Token from the flag, then `NOTEPIN_GIST_TOKEN`, then piped stdin.
pub fn resolve_token(explicit: Option<String>) -> Result<String, CliError> {
    if let Some(token) = explicit.as_deref().and_then(normalize_content) {
        return Ok(token);
    }
    if let Some(token) = env::var("NOTEPIN_GIST_TOKEN")
        .ok()
        .as_deref()
        .and_then(normalize_content)
    {
        return Ok(token);
    }
    read_piped_stdin()?.ok_or(CliError::EmptyToken)
}

async fn run_login(token: Option<String>, context: &Context) -> Result<(), CliError> {
    let token = resolve_token(token)?;
    let mut app = open_app(context).await?;
    let user = app.cloud_login(&token).await?;
    println!("Logged in as {}", user.login);
    Ok(())
}

async fn run_logout(context: &Context) -> Result<(), CliError> {
    let mut app = open_app(context).await?;
    app.cloud_logout().await?;
    println!("Logged out");
    Ok(())
}

async fn run_status(context: &Context) -> Result<(), CliError> {
    let app = open_app(context).await?;
    let status = app.cloud_status().await?;

    println!("enabled: {}", status.enabled);
    println!("logged in: {}", status.logged_in);
    println!(
        "backup gist: {}",
        status.gist_id.as_deref().unwrap_or("(none)")
    );
    println!(
        "last local save: {}",
        status.last_saved.as_deref().unwrap_or("(never)")
    );
    println!("notes: {}", app.notes().len());
    Ok(())
}

async fn run_backup(context: &Context) -> Result<(), CliError> {
    let app = open_app(context).await?;
    let gist_id = app.backup_to_cloud().await?;
    println!("Backed up {} notes to gist {gist_id}", app.notes().len());
    Ok(())
}

async fn run_restore(assume_yes: bool, context: &Context) -> Result<(), CliError> {
    let mut app = open_app(context).await?;
    let confirmed = assume_yes
        || confirm("This will replace all local notes with the cloud backup. Continue?")?;
    let restored = app.restore_from_cloud(confirmed).await?;
    println!("Restored {restored} notes");
    Ok(())
}
