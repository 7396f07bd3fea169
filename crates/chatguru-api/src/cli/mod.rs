//! CLI command definitions for the `chatguru` binary.
//!
//! Uses clap derive macros for argument parsing. Model and server flags
//! override values from `config.toml` and fall back to `CHATGURU_*`
//! environment variables.

pub mod chat;
pub mod check;
pub mod persona;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use chatguru_types::config::AppConfig;

/// Chat with a local Llama 2 model under a selectable persona.
#[derive(Parser)]
#[command(name = "chatguru", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the `[model]` and `[server]` config tables.
#[derive(Args, Debug, Default)]
pub struct ModelArgs {
    /// Path to the GGUF model weights.
    #[arg(long, global = true, env = "CHATGURU_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Sampling temperature.
    #[arg(long, global = true, env = "CHATGURU_TEMPERATURE")]
    pub temperature: Option<f64>,

    /// Maximum tokens generated per reply.
    #[arg(long, global = true, env = "CHATGURU_MAX_TOKENS")]
    pub max_tokens: Option<u32>,

    /// Context window (prompt + reply tokens).
    #[arg(long, global = true, env = "CHATGURU_CONTEXT_WINDOW")]
    pub context_window: Option<u32>,

    /// Number of layers offloaded to the GPU.
    #[arg(long, global = true, env = "CHATGURU_ACCEL_LAYERS")]
    pub accel_layers: Option<u32>,

    /// Use an already running OpenAI-compatible server instead of launching one.
    #[arg(long, global = true, env = "CHATGURU_BASE_URL")]
    pub base_url: Option<String>,

    /// API key for the inference server, if it requires one.
    #[arg(long, global = true, env = "CHATGURU_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl ModelArgs {
    /// Apply flags on top of file configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.model_path {
            config.model.model_path = path.clone();
        }
        if let Some(temperature) = self.temperature {
            config.model.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.model.max_tokens = max_tokens;
        }
        if let Some(context_window) = self.context_window {
            config.model.context_window = context_window;
        }
        if let Some(layers) = self.accel_layers {
            config.model.accel_layers = layers;
        }
        if let Some(url) = &self.base_url {
            config.server.base_url = Some(url.clone());
        }
        if let Some(key) = &self.api_key {
            config.server.api_key = Some(key.clone());
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session.
    Chat {
        /// Persona to start with (e.g. "Tech Support").
        #[arg(long, short)]
        persona: Option<String>,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to `[http].port`).
        #[arg(long, short)]
        port: Option<u16>,

        /// Host to bind to (defaults to `[http].host`).
        #[arg(long)]
        host: Option<String>,
    },

    /// List available personas.
    Personas,

    /// Send a probe through the model backend.
    Check,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
