//! Chat turn orchestration.
//!
//! `ChatService` turns one line of user input into one model reply:
//! append the user message, send the whole transcript, append the answer.
//! There is no retry and no rollback; a failed call leaves the user message
//! in place so the transcript shows the unanswered turn.

use std::time::Instant;

use tracing::{Instrument, debug, info, info_span, warn};

use chatguru_types::chat::TurnOutcome;
use chatguru_types::config::ModelConfig;
use chatguru_types::error::ChatError;
use chatguru_types::llm::CompletionRequest;

use crate::llm::box_provider::BoxLlmProvider;

use super::session::SessionStore;

/// Generation parameters attached to every request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl From<&ModelConfig> for GenerationSettings {
    fn from(config: &ModelConfig) -> Self {
        Self {
            model: config.model_name(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Runs user turns against an inference backend.
///
/// Stateless apart from the provider handle; the conversation lives in the
/// `SessionStore` passed to each call.
pub struct ChatService {
    provider: BoxLlmProvider,
    settings: GenerationSettings,
}

impl ChatService {
    pub fn new(provider: BoxLlmProvider, settings: GenerationSettings) -> Self {
        Self { provider, settings }
    }

    pub fn provider(&self) -> &BoxLlmProvider {
        &self.provider
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Build the request for the current transcript.
    pub fn build_request(&self, store: &SessionStore) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: store.to_llm_messages(),
            max_tokens: self.settings.max_tokens,
            temperature: Some(self.settings.temperature),
        }
    }

    /// Submit one line of user input.
    ///
    /// Blank input returns [`TurnOutcome::Skipped`] without touching the
    /// transcript or the backend. On backend failure the user message is
    /// kept and [`ChatError::InferenceFailure`] is returned.
    pub async fn submit_turn(
        &self,
        store: &mut SessionStore,
        input: &str,
    ) -> Result<TurnOutcome, ChatError> {
        if input.trim().is_empty() {
            debug!(session_id = %store.id(), "Ignoring blank input");
            return Ok(TurnOutcome::Skipped);
        }

        store.append_user(input)?;
        let request = self.build_request(store);

        let span = info_span!(
            "gen_ai.chat",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            session_id = %store.id(),
            persona = %store.persona(),
            messages = request.messages.len(),
        );

        let start = Instant::now();
        let response = match self.provider.complete(&request).instrument(span).await {
            Ok(response) => response,
            Err(e) => {
                warn!(session_id = %store.id(), error = %e, "Inference failed; user turn left unanswered");
                return Err(ChatError::InferenceFailure(e));
            }
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        info!(
            session_id = %store.id(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = %response.stop_reason,
            elapsed_ms,
            "Turn answered"
        );

        store.append_assistant(response.content.clone());

        Ok(TurnOutcome::Answered {
            reply: response.content,
            usage: response.usage,
            elapsed_ms,
        })
    }
}
