use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use combinate_generate::GenerateOptions;

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "combinate.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type SettingsResult<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub pretty: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliSettings {
    pub generate: GenerateOptions,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

/// Load settings from `path`, or from [`DEFAULT_SETTINGS_FILE`] when it
/// exists, or fall back to defaults.
pub fn load_settings(path: Option<&Path>) -> SettingsResult<CliSettings> {
    let path = match path {
        Some(path) => path,
        None => {
            let default = Path::new(DEFAULT_SETTINGS_FILE);
            if !default.exists() {
                return Ok(CliSettings::default());
            }
            default
        }
    };

    let content = std::fs::read_to_string(path)?;
    parse_settings(&content)
}

pub fn parse_settings(content: &str) -> SettingsResult<CliSettings> {
    Ok(toml::from_str(content)?)
}
