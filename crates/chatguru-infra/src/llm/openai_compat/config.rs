//! Configuration for OpenAI-compatible inference servers.
//!
//! `llama.cpp`'s `llama-server` exposes the OpenAI chat completions protocol
//! under `/v1`, so one client covers both a server ChatGuru launches itself
//! and one the user already runs.

use secrecy::SecretString;

use chatguru_types::config::ModelConfig;
use chatguru_types::llm::ProviderCapabilities;

/// Placeholder key; `llama-server` ignores it unless started with `--api-key`.
const LOCAL_API_KEY: &str = "no-key";

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "llama.cpp").
    pub provider_name: String,
    /// Base URL for the API (e.g., "http://127.0.0.1:8081/v1").
    pub base_url: String,
    pub api_key: SecretString,
    /// Model identifier sent with each request.
    pub model: String,
    pub capabilities: ProviderCapabilities,
}

/// Local `llama.cpp` server configuration.
///
/// Capabilities come from the model settings: the context window is the
/// configured `context_window`, the output cap is `max_tokens`.
pub fn llama_cpp_defaults(
    base_url: &str,
    api_key: Option<&str>,
    model: &ModelConfig,
) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "llama.cpp".into(),
        base_url: base_url.trim_end_matches('/').into(),
        api_key: SecretString::from(api_key.unwrap_or(LOCAL_API_KEY).to_string()),
        model: model.model_name(),
        capabilities: ProviderCapabilities {
            max_context_tokens: model.context_window,
        },
    }
}
