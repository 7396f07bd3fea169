//! LLM backend for ChatGuru.
//!
//! The model is served by `llama.cpp`'s `llama-server` and reached through
//! its OpenAI-compatible API. [`start_backend`] either points at a server
//! the user already runs (`server.base_url`) or launches one with
//! [`llama_server::LlamaServer`]. [`create_provider`] wraps the endpoint in a
//! [`BoxLlmProvider`], and [`test_provider_connection`] sends a tiny probe.

pub mod llama_server;
pub mod openai_compat;

use chatguru_core::llm::box_provider::BoxLlmProvider;
use chatguru_types::config::{AppConfig, ModelConfig, ServerConfig};
use chatguru_types::llm::{CompletionRequest, LlmError, Message, MessageRole};
use chatguru_types::persona::DEFAULT_SYSTEM_PROMPT;

use self::llama_server::LlamaServer;
use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxLlmProvider`] for the server at `base_url`.
pub fn create_provider(model: &ModelConfig, server: &ServerConfig, base_url: &str) -> BoxLlmProvider {
    let config = openai_compat::config::llama_cpp_defaults(base_url, server.api_key.as_deref(), model);
    BoxLlmProvider::new(OpenAiCompatibleProvider::new(config))
}

/// Verify the backend answers by sending a minimal completion request.
///
/// # Errors
///
/// Returns the LLM error if the provider fails to respond.
pub async fn test_provider_connection(provider: &BoxLlmProvider) -> Result<(), LlmError> {
    let request = CompletionRequest {
        model: String::new(),
        messages: vec![
            Message {
                role: MessageRole::System,
                content: DEFAULT_SYSTEM_PROMPT.to_string(),
            },
            Message {
                role: MessageRole::User,
                content: "Hello".to_string(),
            },
        ],
        max_tokens: 10,
        temperature: Some(0.0),
    };
    provider.complete(&request).await?;
    Ok(())
}

/// Where inference requests go.
pub enum ModelBackend {
    /// A server started outside ChatGuru.
    Remote { base_url: String },
    /// A `llama-server` child owned by this process.
    Launched(LlamaServer),
}

impl ModelBackend {
    pub fn base_url(&self) -> String {
        match self {
            Self::Remote { base_url } => base_url.clone(),
            Self::Launched(server) => server.base_url(),
        }
    }

    /// Stop a launched server. No-op for remote backends.
    pub async fn shutdown(self) {
        if let Self::Launched(server) = self {
            server.shutdown().await;
        }
    }
}

/// Resolve the backend: an explicit `server.base_url` wins, otherwise a
/// `llama-server` is launched with the configured model.
///
/// # Errors
///
/// [`LlmError::Unavailable`] if the server has to be launched and fails to
/// come up.
pub async fn start_backend(config: &AppConfig) -> Result<ModelBackend, LlmError> {
    if let Some(base_url) = config.server.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
        tracing::info!(base_url, "Using existing inference server");
        return Ok(ModelBackend::Remote {
            base_url: base_url.to_string(),
        });
    }
    let server = LlamaServer::launch(&config.model, &config.server).await?;
    Ok(ModelBackend::Launched(server))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider() {
        let provider = create_provider(
            &ModelConfig::default(),
            &ServerConfig::default(),
            "http://127.0.0.1:8081/v1",
        );
        assert_eq!(provider.name(), "llama.cpp");
        assert_eq!(provider.capabilities().max_context_tokens, 3900);
    }

    #[tokio::test]
    async fn test_start_backend_prefers_base_url() {
        let mut config = AppConfig::default();
        config.server.base_url = Some("http://gpu-box:8080/v1".to_string());

        let backend = start_backend(&config).await.unwrap();
        assert!(matches!(backend, ModelBackend::Remote { .. }));
        assert_eq!(backend.base_url(), "http://gpu-box:8080/v1");
        backend.shutdown().await;
    }

    #[tokio::test]
    async fn test_start_backend_blank_base_url_launches() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.server.base_url = Some("  ".to_string());
        config.model.model_path = tmp.path().join("missing.gguf");

        // Falls through to launching, which fails on the missing weights.
        let err = start_backend(&config).await.err().unwrap();
        assert!(matches!(err, LlmError::Unavailable(_)));
    }
}
