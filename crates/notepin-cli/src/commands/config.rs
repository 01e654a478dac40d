use crate::cli::ConfigCommands;
use crate::commands::common::Context;
use crate::config_file::{save_config, with_config_value};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, context: &Context) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => {
            println!("# {}", context.config_path.display());
            println!("{}", serde_json::to_string_pretty(&context.config)?);
            Ok(())
        }
        ConfigCommands::Set { key, value } => {
            let updated = with_config_value(&context.config, &key, &value)?;
            save_config(&updated, &context.config_path)?;
            println!("Saved {key} to {}", context.config_path.display());
            Ok(())
        }
    }
}
