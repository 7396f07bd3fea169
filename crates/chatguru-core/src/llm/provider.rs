//! The inference port.
//!
//! `complete` is declared with RPITIT, so the trait is not object safe on its
//! own; see `box_provider` for the erased form hosts hold at runtime.

use chatguru_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities};

/// Trait for inference backends.
///
/// A call is atomic: one request in, one full response (or error) out.
/// Implementations must forward `request.messages` in order with their
/// role tags intact.
///
/// Implementations live in chatguru-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "llama.cpp").
    fn name(&self) -> &str;

    /// Context window of the loaded model.
    fn capabilities(&self) -> &ProviderCapabilities;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
