//! Configuration loader for ChatGuru.
//!
//! Reads `config.toml` from the data directory (`~/.chatguru/` by default,
//! `$CHATGURU_HOME` when set) and deserializes it into [`AppConfig`]. Falls
//! back to defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use chatguru_types::config::AppConfig;
use chatguru_types::error::ConfigError;

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "CHATGURU_HOME";

/// Resolve the data directory: `$CHATGURU_HOME`, else `~/.chatguru`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(HOME_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".chatguru")
}

/// Path of the config file inside a data directory.
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

/// Read and parse a config file strictly.
///
/// Returns `Ok(None)` when the file does not exist.
pub async fn read_config_file(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    toml::from_str::<AppConfig>(&content)
        .map(Some)
        .map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        })
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file cannot be read or parsed, logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let path = config_path(data_dir);
    match read_config_file(&path).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            tracing::debug!("No config.toml found at {}, using defaults", path.display());
            AppConfig::default()
        }
        Err(err) => {
            tracing::warn!("{err}, using defaults");
            AppConfig::default()
        }
    }
}
