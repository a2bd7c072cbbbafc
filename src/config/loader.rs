//! Settings loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::Settings;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the settings file.
pub const SETTINGS_ENV: &str = "RESTFUL_SETTINGS";

/// Error type for settings loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error(
        "Requested settings, but settings are not configured. You must define the environment variable {0} before accessing settings."
    )]
    MissingEnvironment(&'static str),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate settings from a TOML file.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let content = fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;

    validate_config(&settings).map_err(ConfigError::Validation)?;

    Ok(settings)
}

/// Load settings from the file named by [`SETTINGS_ENV`].
pub fn load_from_env() -> Result<Settings, ConfigError> {
    let path = std::env::var_os(SETTINGS_ENV).ok_or(ConfigError::MissingEnvironment(SETTINGS_ENV))?;
    load_config(Path::new(&path))
}
