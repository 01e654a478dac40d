//! Notepin CLI - notes with images, map pins and gist backups
//!
//! Every command loads the collection from local storage, applies one
//! operation through the application controller and exits.

mod cli;
mod commands;
mod config_file;
mod error;
#[cfg(test)]
mod tests;

use clap::Parser;
use notepin_core::editor::Direction;
use tracing_subscriber::filter::Directive;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::cloud::run_cloud;
use crate::commands::common::{resolve_db_path, Context};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::{run_clear, run_delete};
use crate::commands::edit::{run_edit, EditFlags};
use crate::commands::export::{run_export, run_import};
use crate::commands::list::{run_grid, run_list};
use crate::commands::map::run_map;
use crate::commands::show::{run_navigate, run_show};
use crate::config_file::{load_config, resolve_config_path};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "notepin=info".parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config)?;
    let context = Context {
        db_path: resolve_db_path(cli.db_path)?,
        config: load_config(&config_path)?,
        config_path,
    };

    match cli.command {
        Commands::Add {
            title,
            content,
            image,
            lat,
            lng,
        } => run_add(&title, &content, image.as_deref(), lat.zip(lng), &context).await,
        Commands::List { json } => run_list(json, &context).await,
        Commands::Grid => run_grid(&context).await,
        Commands::Show { id } => run_show(&id, &context).await,
        Commands::Next => run_navigate(Direction::Next, &context).await,
        Commands::Prev => run_navigate(Direction::Previous, &context).await,
        Commands::Edit {
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
            run_edit(&id, flags, &context).await
        }
        Commands::Delete { id, yes } => run_delete(id.as_deref(), yes, &context).await,
        Commands::Clear { yes } => run_clear(yes, &context).await,
        Commands::Export { output } => run_export(output.as_deref(), &context).await,
        Commands::Import { path } => run_import(&path, &context).await,
        Commands::Map { command } => run_map(command, &context).await,
        Commands::Cloud { command } => run_cloud(command, &context).await,
        Commands::Config { command } => run_config(command, &context),
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref()),
    }
}
