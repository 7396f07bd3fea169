use thiserror::Error;
use uuid::Uuid;

use crate::llm::LlmError;

/// Errors from chat session operations.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A blank message was offered for the transcript.
    #[error("message is empty")]
    EmptyInput,

    /// The inference backend failed to answer a turn.
    ///
    /// The user message that triggered the call stays in the transcript.
    #[error("inference failed: {0}")]
    InferenceFailure(#[from] LlmError),

    #[error("session {0} not found")]
    SessionNotFound(Uuid),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
