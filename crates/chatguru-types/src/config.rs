//! Configuration types for ChatGuru.
//!
//! `AppConfig` represents the top-level `config.toml`. Every field has a
//! default, so an empty or missing file yields a working configuration that
//! launches a local `llama-server` with the stock chat model.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
///
/// Loaded from `~/.chatguru/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model weights and generation parameters.
    #[serde(default)]
    pub model: ModelConfig,

    /// How to reach (or launch) the local inference server.
    #[serde(default)]
    pub server: ServerConfig,

    /// Bind address for `chatguru serve`.
    #[serde(default)]
    pub http: HttpConfig,
}

impl AppConfig {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.model;
        if !(0.0..=2.0).contains(&m.temperature) {
            return Err(ConfigError::Invalid(format!(
                "model.temperature must be within 0.0..=2.0, got {}",
                m.temperature
            )));
        }
        if m.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "model.max_tokens must be greater than zero".to_string(),
            ));
        }
        if m.max_tokens >= m.context_window {
            return Err(ConfigError::Invalid(format!(
                "model.max_tokens ({}) must be smaller than model.context_window ({})",
                m.max_tokens, m.context_window
            )));
        }
        Ok(())
    }
}

/// Model weights location and generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// File location of the GGUF weights.
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Generation cap per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Maximum input + output tokens.
    #[serde(default = "default_context_window")]
    pub context_window: u32,

    /// Number of layers offloaded to the GPU.
    #[serde(default = "default_accel_layers")]
    pub accel_layers: u32,
}

impl ModelConfig {
    /// Model identifier sent with each request: the weights file stem.
    pub fn model_name(&self) -> String {
        model_name_from_path(&self.model_path)
    }
}

fn model_name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "local-model".to_string())
}

fn default_model_path() -> PathBuf {
    PathBuf::from("llama-2-7b-chat.Q2_K.gguf")
}

fn default_temperature() -> f64 {
    0.1
}

fn default_max_tokens() -> u32 {
    500
}

fn default_context_window() -> u32 {
    3900
}

fn default_accel_layers() -> u32 {
    1
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            context_window: default_context_window(),
            accel_layers: default_accel_layers(),
        }
    }
}

/// Local inference server settings.
///
/// When `base_url` is set, ChatGuru talks to an already-running
/// OpenAI-compatible server. Otherwise it launches `llama_server_bin`
/// itself on `port`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_llama_server_bin")]
    pub llama_server_bin: String,

    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Seconds to wait for the launched server to finish loading the model.
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,
}

fn default_llama_server_bin() -> String {
    "llama-server".to_string()
}

fn default_server_port() -> u16 {
    8081
}

fn default_startup_timeout_secs() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            llama_server_bin: default_llama_server_bin(),
            port: default_server_port(),
            startup_timeout_secs: default_startup_timeout_secs(),
        }
    }
}

/// Bind address and session lifetime for the REST API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_host")]
    pub host: String,

    #[serde(default = "default_http_port")]
    pub port: u16,

    /// Seconds a session may sit unused before it is dropped. 0 keeps
    /// sessions until they are deleted.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

impl HttpConfig {
    /// Idle limit for sessions, `None` when expiry is off.
    pub fn session_idle_limit(&self) -> Option<Duration> {
        (self.session_idle_secs > 0).then(|| Duration::from_secs(self.session_idle_secs))
    }
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_session_idle_secs() -> u64 {
    1800
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}
