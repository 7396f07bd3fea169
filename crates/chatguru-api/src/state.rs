//! Application state shared by the CLI and the REST API.

use std::sync::Arc;

use chatguru_core::chat::registry::SessionRegistry;
use chatguru_core::chat::service::{ChatService, GenerationSettings};
use chatguru_core::llm::box_provider::BoxLlmProvider;
use chatguru_types::config::AppConfig;

/// Shared application state.
///
/// Cheap to clone; axum hands a clone to every handler.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ChatService>,
    pub sessions: SessionRegistry,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire the chat service around a provider.
    pub fn new(provider: BoxLlmProvider, config: AppConfig) -> Self {
        let settings = GenerationSettings::from(&config.model);
        Self {
            chat_service: Arc::new(ChatService::new(provider, settings)),
            sessions: SessionRegistry::new(),
            config: Arc::new(config),
        }
    }
}
