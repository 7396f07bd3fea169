//! OpenAI-compatible LLM provider implementation.
//!
//! Talks to `llama.cpp`'s server (or any other server speaking the OpenAI
//! chat completions protocol) via [`async_openai`]. Requests are
//! non-streaming: one transcript in, one full reply out.

pub mod config;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest, FinishReason,
};
use secrecy::ExposeSecret;

use chatguru_core::llm::provider::LlmProvider;
use chatguru_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, Message, MessageRole, ProviderCapabilities,
    StopReason, Usage,
};

use self::config::OpenAiCompatConfig;

/// Unified provider for any OpenAI-compatible API.
///
/// Does NOT derive Debug: the `async_openai::Client` holds the API key.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
    capabilities: ProviderCapabilities,
}

impl OpenAiCompatibleProvider {
    /// Create a new OpenAI-compatible provider from a configuration.
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
            model: config.model,
            capabilities: config.capabilities,
        }
    }

    /// Build a [`CreateChatCompletionRequest`] from a generic [`CompletionRequest`].
    ///
    /// Messages are forwarded one-to-one, in order, with their roles.
    fn build_request(
        &self,
        request: &CompletionRequest,
    ) -> Result<CreateChatCompletionRequest, LlmError> {
        if request.messages.is_empty() {
            return Err(LlmError::InvalidRequest("no messages to send".to_string()));
        }

        let messages = request.messages.iter().map(to_openai_message).collect();

        // Use the model from the request if set, otherwise fall back to config default
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        Ok(CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        })
    }

    /// Estimated prompt tokens plus the reply budget.
    fn requested_tokens(request: &CompletionRequest) -> u32 {
        estimate_tokens(&request.messages).saturating_add(request.max_tokens)
    }

    /// Reject requests whose prompt plus reply cannot fit the context window.
    fn check_context(&self, request: &CompletionRequest) -> Result<(), LlmError> {
        let requested = Self::requested_tokens(request);
        let max = self.capabilities.max_context_tokens;
        if requested > max {
            return Err(LlmError::ContextLengthExceeded { max, requested });
        }
        Ok(())
    }

    /// Map an `async_openai` error onto [`LlmError`].
    ///
    /// The server's own context-overflow report carries no numbers we can
    /// parse reliably, so it is filled in from this provider's window and
    /// the request's estimate.
    fn map_openai_error(
        &self,
        err: async_openai::error::OpenAIError,
        request: &CompletionRequest,
    ) -> LlmError {
        use async_openai::error::OpenAIError;

        match &err {
            OpenAIError::ApiError(api_err) => {
                let code = api_err.code.as_deref().unwrap_or("");
                let error_type = api_err.r#type.as_deref().unwrap_or("");

                if code == "authentication_error" || error_type == "authentication_error" {
                    LlmError::AuthenticationFailed
                } else if is_context_overflow(error_type, &api_err.message) {
                    LlmError::ContextLengthExceeded {
                        max: self.capabilities.max_context_tokens,
                        requested: Self::requested_tokens(request),
                    }
                } else if error_type == "unavailable_error" {
                    LlmError::Unavailable(api_err.message.clone())
                } else {
                    LlmError::Provider {
                        message: err.to_string(),
                    }
                }
            }
            OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status() {
                Some(status) if status.as_u16() == 401 => LlmError::AuthenticationFailed,
                // llama-server answers 503 while the model is still loading
                Some(status) if status.as_u16() == 503 => LlmError::Unavailable(err.to_string()),
                Some(_) => LlmError::Provider {
                    message: err.to_string(),
                },
                None if reqwest_err.is_connect() => LlmError::Unavailable(err.to_string()),
                None => LlmError::Provider {
                    message: err.to_string(),
                },
            },
            OpenAIError::JSONDeserialize(_, content) => {
                LlmError::Deserialization(format!("failed to parse response: {content}"))
            }
            OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
            _ => LlmError::Provider {
                message: err.to_string(),
            },
        }
    }
}

fn is_context_overflow(error_type: &str, message: &str) -> bool {
    error_type == "exceed_context_size_error"
        || message.contains("context size")
        || message.contains("maximum context length")
}

fn to_openai_message(msg: &Message) -> ChatCompletionRequestMessage {
    match msg.role {
        MessageRole::System => {
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(msg.content.clone()),
                name: None,
            })
        }
        MessageRole::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
            name: None,
        }),
        MessageRole::Assistant => {
            #[allow(deprecated)]
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                    msg.content.clone(),
                )),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
    }
}

/// Character-based token estimate: ~4 chars per token plus per-message overhead.
pub fn estimate_tokens(messages: &[Message]) -> u32 {
    let total_chars: usize = messages.iter().map(|m| m.content.len() + 10).sum();
    (total_chars as f64 / 4.0).ceil() as u32
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.check_context(request)?;
        let oai_request = self.build_request(request)?;

        tracing::debug!(
            provider = %self.provider_name,
            messages = request.messages.len(),
            "Sending chat completion"
        );

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(|e| self.map_openai_error(e, request))?;

        let choice = response.choices.first();

        let content = choice
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let stop_reason = choice
            .and_then(|c| c.finish_reason.as_ref())
            .map(|fr| match fr {
                FinishReason::Length => StopReason::MaxTokens,
                _ => StopReason::EndTurn,
            })
            .unwrap_or(StopReason::EndTurn);

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            stop_reason,
            usage,
        })
    }
}
