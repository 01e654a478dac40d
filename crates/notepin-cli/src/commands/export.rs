use std::path::{Path, PathBuf};

use chrono::Utc;
use notepin_core::export::suggested_export_file_name;

use crate::commands::common::{open_app, Context};
use crate::error::CliError;

pub async fn run_export(output_path: Option<&Path>, context: &Context) -> Result<(), CliError> {
    let app = open_app(context).await?;
    let rendered = app.export_json()?;

    let path = output_path.map_or_else(
        || PathBuf::from(suggested_export_file_name(Utc::now())),
        Path::to_path_buf,
    );
    std::fs::write(&path, rendered)?;
    println!("{}", path.display());
    Ok(())
}

pub async fn run_import(path: &Path, context: &Context) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(path)?;
    let mut app = open_app(context).await?;
    let summary = app.import_json(&raw).await?;

    println!(
        "Imported {} notes ({} already present)",
        summary.imported, summary.skipped
    );
    Ok(())
}
