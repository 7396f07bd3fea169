//! Session HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/sessions                - Create a session
//! - GET    /api/v1/sessions/{id}           - Session summary
//! - GET    /api/v1/sessions/{id}/messages  - Conversation without the system prompt
//! - PUT    /api/v1/sessions/{id}/persona   - Switch persona
//! - POST   /api/v1/sessions/{id}/clear     - Clear the conversation, keep the persona
//! - POST   /api/v1/sessions/{id}/turns     - Ask a question
//! - DELETE /api/v1/sessions/{id}           - Tear the session down
//!
//! Each handler holds the session's lock for its whole run, so requests on
//! one session are handled one at a time.

use std::time::Instant;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use chatguru_types::chat::{ChatMessage, SessionSummary, TurnOutcome};
use chatguru_types::persona::Persona;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub persona: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetPersonaRequest {
    pub persona: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitTurnRequest {
    pub message: String,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

/// Decode a JSON body; an empty body yields the default value.
fn parse_optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))
}

fn session_link(id: Uuid) -> String {
    format!("/api/v1/sessions/{id}")
}

/// POST /api/v1/sessions
pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<SessionSummary>>), AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let req: CreateSessionRequest = parse_optional_body(&body)?;
    let persona = req.persona.as_deref().map(Persona::resolve);
    let (id, session) = state.sessions.create(persona);
    let summary = session.lock().await.summary();

    tracing::info!(session_id = %id, persona = %summary.persona, "Session created over HTTP");

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(summary, request_id, elapsed)
        .with_link("self", &session_link(id))
        .with_link("turns", &format!("{}/turns", session_link(id)));
    Ok((StatusCode::CREATED, Json(resp)))
}

/// GET /api/v1/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionSummary>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let summary = state.sessions.get(&sid)?.lock().await.summary();

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(summary, request_id, elapsed).with_link("self", &session_link(sid)),
    ))
}

/// GET /api/v1/sessions/{id}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let messages = state.sessions.get(&sid)?.lock().await.render_view().to_vec();

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(messages, request_id, elapsed)
            .with_link("self", &format!("{}/messages", session_link(sid)))
            .with_link("session", &session_link(sid)),
    ))
}

/// PUT /api/v1/sessions/{id}/persona
///
/// Unknown names fall back to General; the response shows what was applied.
pub async fn set_persona(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SetPersonaRequest>,
) -> Result<Json<ApiResponse<SessionSummary>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let session = state.sessions.get(&sid)?;
    let summary = {
        let mut store = session.lock().await;
        store.set_persona(&req.persona);
        store.summary()
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(summary, request_id, elapsed).with_link("self", &session_link(sid)),
    ))
}

/// POST /api/v1/sessions/{id}/clear
pub async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionSummary>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let session = state.sessions.get(&sid)?;
    let summary = {
        let mut store = session.lock().await;
        let selected = store.persona();
        store.reset();
        store.apply_persona(selected);
        store.summary()
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(summary, request_id, elapsed).with_link("self", &session_link(sid)),
    ))
}

/// POST /api/v1/sessions/{id}/turns
pub async fn submit_turn(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SubmitTurnRequest>,
) -> Result<Json<ApiResponse<TurnOutcome>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let session = state.sessions.get(&sid)?;
    let outcome = {
        let mut store = session.lock().await;
        state.chat_service.submit_turn(&mut store, &req.message).await?
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(outcome, request_id, elapsed)
            .with_link("messages", &format!("{}/messages", session_link(sid))),
    ))
}

/// DELETE /api/v1/sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    state.sessions.remove(&sid)?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": true, "id": sid }),
        request_id,
        elapsed,
    )))
}
