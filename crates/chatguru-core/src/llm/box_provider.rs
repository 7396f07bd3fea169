//! Runtime-selected inference backend.
//!
//! `ErasedProvider` re-declares [`LlmProvider`] with a pinned, boxed future
//! so it can live behind `dyn`. Every provider gets it through the blanket
//! impl below, and [`BoxLlmProvider`] is the handle the rest of the crate
//! passes around.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chatguru_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities};

use super::provider::LlmProvider;

type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>>;

trait ErasedProvider: Send + Sync {
    fn name(&self) -> &str;
    fn capabilities(&self) -> &ProviderCapabilities;
    fn complete<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a>;
}

impl<P: LlmProvider> ErasedProvider for P {
    fn name(&self) -> &str {
        LlmProvider::name(self)
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        LlmProvider::capabilities(self)
    }

    fn complete<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(LlmProvider::complete(self, request))
    }
}

/// Shared, type-erased provider. Clones point at the same backend.
#[derive(Clone)]
pub struct BoxLlmProvider(Arc<dyn ErasedProvider>);

impl BoxLlmProvider {
    pub fn new<P: LlmProvider + 'static>(provider: P) -> Self {
        Self(Arc::new(provider))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn capabilities(&self) -> &ProviderCapabilities {
        self.0.capabilities()
    }

    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        self.0.complete(request).await
    }
}

impl std::fmt::Debug for BoxLlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BoxLlmProvider").field(&self.name()).finish()
    }
}
