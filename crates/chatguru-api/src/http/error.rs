//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use chatguru_types::error::ChatError;
use chatguru_types::llm::LlmError;

use super::response::ApiResponse;

#[derive(Debug)]
pub enum AppError {
    Chat(ChatError),
    /// Malformed request (bad UUID, unparsable body).
    Validation(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Chat(ChatError::SessionNotFound(id)) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                format!("Session {id} not found"),
            ),
            AppError::Chat(ChatError::EmptyInput) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Message must not be blank".to_string(),
            ),
            AppError::Chat(ChatError::InferenceFailure(LlmError::ContextLengthExceeded {
                ..
            })) => (
                StatusCode::BAD_GATEWAY,
                "CONTEXT_LENGTH_EXCEEDED",
                self.to_string(),
            ),
            AppError::Chat(ChatError::InferenceFailure(_)) => {
                (StatusCode::BAD_GATEWAY, "INFERENCE_FAILURE", self.to_string())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Chat(e) => write!(f, "{e}"),
            AppError::Validation(msg) => write!(f, "{msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::warn!(code, %message, "Request failed");
        }
        let body = ApiResponse::error(code, &message, Uuid::now_v7().to_string());
        (status, Json(body)).into_response()
    }
}
