//! Persistent CLI configuration file.

use std::env;
use std::path::{Path, PathBuf};

use notepin_core::AppConfig;
use serde_json::Value;

use crate::error::CliError;

const CONFIG_FILE_NAME: &str = "config.json";

pub fn default_config_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join("notepin").join(CONFIG_FILE_NAME))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI config directory".to_string()))
}

pub fn resolve_config_path(cli_config_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match cli_config_path.or_else(|| env::var_os("NOTEPIN_CONFIG").map(PathBuf::from)) {
        Some(path) => Ok(path),
        None => default_config_path(),
    }
}

/// Read the config file; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, CliError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = std::fs::read_to_string(path).map_err(|error| {
        CliError::Config(format!(
            "Failed to read config at {}: {}",
            path.display(),
            error
        ))
    })?;
    AppConfig::from_json(&raw).map_err(|error| {
        CliError::Config(format!(
            "Failed to parse config at {}: {}",
            path.display(),
            error
        ))
    })
}

pub fn save_config(config: &AppConfig, path: &Path) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|error| {
            CliError::Config(format!(
                "Failed to create config directory {}: {}",
                parent.display(),
                error
            ))
        })?;
    }

    let mut normalized = config.clone();
    normalized.normalize();
    let serialized = serde_json::to_string_pretty(&normalized)?;
    std::fs::write(path, serialized).map_err(|error| {
        CliError::Config(format!(
            "Failed to write config at {}: {}",
            path.display(),
            error
        ))
    })
}

/// Return a copy of `config` with the dotted `key` set to `raw_value`.
///
/// The value is parsed according to the type of the field it replaces.
pub fn with_config_value(
    config: &AppConfig,
    key: &str,
    raw_value: &str,
) -> Result<AppConfig, CliError> {
    let mut document = serde_json::to_value(config)?;
    let mut slot = &mut document;
    for part in key.split('.') {
        slot = slot
            .get_mut(part)
            .ok_or_else(|| CliError::Config(format!("Unknown config key: {key}")))?;
    }

    *slot = match &*slot {
        Value::Bool(_) => raw_value
            .trim()
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|_| CliError::Config(format!("{key} expects true or false")))?,
        Value::Number(_) => serde_json::from_str::<serde_json::Number>(raw_value.trim())
            .map(Value::Number)
            .map_err(|_| CliError::Config(format!("{key} expects a number")))?,
        Value::String(_) => Value::String(raw_value.to_string()),
        _ => {
            return Err(CliError::Config(format!(
                "{key} is a section; set one of its fields instead"
            )))
        }
    };

    let mut updated: AppConfig = serde_json::from_value(document)
        .map_err(|error| CliError::Config(format!("Invalid value for {key}: {error}")))?;
    updated.normalize();
    updated.validate()?;
    Ok(updated)
}
