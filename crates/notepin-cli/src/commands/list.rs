use crate::commands::common::{format_grid_lines, format_list_lines, open_app, Context};
use crate::error::CliError;

pub async fn run_list(as_json: bool, context: &Context) -> Result<(), CliError> {
    let app = open_app(context).await?;
    let items = app.list();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for line in format_list_lines(&items) {
            println!("{line}");
        }
        println!("{}", app.counter());
    }

    Ok(())
}

pub async fn run_grid(context: &Context) -> Result<(), CliError> {
    let app = open_app(context).await?;
    for line in format_grid_lines(&app.grid()) {
        println!("{line}");
    }
    Ok(())
}
