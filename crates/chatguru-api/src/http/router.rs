//! Axum router configuration with middleware.
//!
//! All API routes are under `/api/v1/`; `/health` sits at the root.
//! Middleware: CORS, HTTP tracing.

use axum::Router;
use axum::extract::State;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/personas", get(handlers::persona::list_personas))
        .route("/sessions", post(handlers::session::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::session::get_session).delete(handlers::session::delete_session),
        )
        .route(
            "/sessions/{id}/messages",
            get(handlers::session::get_messages),
        )
        .route(
            "/sessions/{id}/persona",
            put(handlers::session::set_persona),
        )
        .route(
            "/sessions/{id}/clear",
            post(handlers::session::clear_session),
        )
        .route(
            "/sessions/{id}/turns",
            post(handlers::session::submit_turn),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.chat_service.settings().model,
        "provider": state.chat_service.provider().name(),
        "context_window": state.config.model.context_window,
        "sessions": state.sessions.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tokio::sync::Notify;
    use tokio::task::JoinHandle;
    use tower::ServiceExt;

    use chatguru_core::llm::box_provider::BoxLlmProvider;
    use chatguru_core::llm::provider::LlmProvider;
    use chatguru_types::config::AppConfig;
    use chatguru_types::llm::{
        CompletionRequest, CompletionResponse, LlmError, MessageRole, ProviderCapabilities,
        StopReason, Usage,
    };
    use chatguru_types::persona::Persona;

    /// Canned reply, or an outage when `reply` is None.
    struct StubProvider {
        reply: Option<String>,
        calls: Arc<AtomicUsize>,
        capabilities: ProviderCapabilities,
    }

    impl LlmProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(request.messages[0].role, MessageRole::System);
            match &self.reply {
                Some(reply) => Ok(CompletionResponse {
                    id: "cmpl-1".to_string(),
                    content: reply.clone(),
                    model: request.model.clone(),
                    stop_reason: StopReason::EndTurn,
                    usage: Usage {
                        input_tokens: 12,
                        output_tokens: 5,
                    },
                }),
                None => Err(LlmError::Unavailable("model not loaded".to_string())),
            }
        }
    }

    fn app(reply: Option<&str>) -> (Router, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = StubProvider {
            reply: reply.map(str::to_string),
            calls: calls.clone(),
            capabilities: ProviderCapabilities {
                max_context_tokens: 3900,
            },
        };
        let state = AppState::new(BoxLlmProvider::new(provider), AppConfig::default());
        (build_router(state), calls)
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(router: &Router, body: Option<Value>) -> String {
        let (status, value) = send(router, "POST", "/api/v1/sessions", body).await;
        assert_eq!(status, StatusCode::CREATED);
        value["data"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = app(Some("hi"));
        let (status, value) = send(&router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["status"], "ok");
        assert_eq!(value["provider"], "stub");
        assert_eq!(value["context_window"], 3900);
    }

    #[tokio::test]
    async fn test_list_personas() {
        let (router, _) = app(Some("hi"));
        let (status, value) = send(&router, "GET", "/api/v1/personas", None).await;
        assert_eq!(status, StatusCode::OK);
        let personas = value["data"].as_array().unwrap();
        assert_eq!(personas.len(), 6);
        assert_eq!(personas[0]["name"], "General");
        assert_eq!(personas[0]["prompt"], "You are a helpful AI assistant.");
    }

    #[tokio::test]
    async fn test_create_session_defaults_to_general() {
        let (router, _) = app(Some("hi"));
        let id = create(&router, None).await;

        let (status, value) = send(&router, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["data"]["persona"], "General");
        assert_eq!(value["data"]["turn_count"], 0);
        assert_eq!(value["data"]["message_count"], 1);
    }

    #[tokio::test]
    async fn test_create_session_with_unknown_persona_falls_back() {
        let (router, _) = app(Some("hi"));
        let (_, value) = send(
            &router,
            "POST",
            "/api/v1/sessions",
            Some(serde_json::json!({"persona": "Nonexistent"})),
        )
        .await;
        assert_eq!(value["data"]["persona"], "General");
    }

    #[tokio::test]
    async fn test_tech_support_conversation() {
        let (router, calls) = app(Some("Try a hard reset."));
        let id = create(&router, None).await;

        let (status, value) = send(
            &router,
            "PUT",
            &format!("/api/v1/sessions/{id}/persona"),
            Some(serde_json::json!({"persona": "Tech Support"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["data"]["persona"], "Tech Support");

        let (status, value) = send(
            &router,
            "POST",
            &format!("/api/v1/sessions/{id}/turns"),
            Some(serde_json::json!({"message": "My laptop won't boot"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["data"]["status"], "answered");
        assert_eq!(value["data"]["reply"], "Try a hard reset.");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let (_, value) = send(&router, "GET", &format!("/api/v1/sessions/{id}/messages"), None).await;
        let messages = value["data"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "My laptop won't boot");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["content"], "Try a hard reset.");
    }

    #[tokio::test]
    async fn test_blank_turn_is_skipped() {
        let (router, calls) = app(Some("unused"));
        let id = create(&router, None).await;

        let (status, value) = send(
            &router,
            "POST",
            &format!("/api/v1/sessions/{id}/turns"),
            Some(serde_json::json!({"message": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["data"]["status"], "skipped");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_turn_keeps_user_message() {
        let (router, _) = app(None);
        let id = create(&router, None).await;

        let (status, value) = send(
            &router,
            "POST",
            &format!("/api/v1/sessions/{id}/turns"),
            Some(serde_json::json!({"message": "test"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(value["errors"][0]["code"], "INFERENCE_FAILURE");

        let (_, value) = send(&router, "GET", &format!("/api/v1/sessions/{id}/messages"), None).await;
        let messages = value["data"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["content"], "test");
    }

    #[tokio::test]
    async fn test_clear_keeps_persona() {
        let (router, _) = app(Some("Pack light."));
        let id = create(&router, Some(serde_json::json!({"persona": "Travel Planner"}))).await;
        send(
            &router,
            "POST",
            &format!("/api/v1/sessions/{id}/turns"),
            Some(serde_json::json!({"message": "Lisbon tips?"})),
        )
        .await;

        let (status, value) = send(&router, "POST", &format!("/api/v1/sessions/{id}/clear"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["data"]["persona"], Persona::TravelPlanner.name());
        assert_eq!(value["data"]["message_count"], 1);
        assert_eq!(value["data"]["turn_count"], 0);
    }

    #[tokio::test]
    async fn test_delete_session() {
        let (router, _) = app(Some("hi"));
        let id = create(&router, None).await;

        let (status, value) = send(&router, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["data"]["deleted"], true);

        let (status, value) = send(&router, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["errors"][0]["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_invalid_session_id() {
        let (router, _) = app(Some("hi"));
        let (status, value) = send(&router, "GET", "/api/v1/sessions/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["errors"][0]["code"], "VALIDATION_ERROR");
    }

    /// Echoes the last message back. A question of exactly "hold" parks
    /// inside the call until `gate` is notified.
    struct GatedProvider {
        gate: Arc<Notify>,
        entered: Arc<Notify>,
        requests: Arc<Mutex<Vec<Vec<String>>>>,
        capabilities: ProviderCapabilities,
    }

    impl LlmProvider for GatedProvider {
        fn name(&self) -> &str {
            "gated"
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            let contents: Vec<String> = request.messages.iter().map(|m| m.content.clone()).collect();
            let last = contents.last().cloned().unwrap_or_default();
            self.requests.lock().unwrap().push(contents);

            if last == "hold" {
                self.entered.notify_one();
                self.gate.notified().await;
            }

            Ok(CompletionResponse {
                id: "cmpl-gated".to_string(),
                content: format!("re: {last}"),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }

    fn spawn_turn(router: &Router, id: &str, text: &str) -> JoinHandle<(StatusCode, Value)> {
        let router = router.clone();
        let uri = format!("/api/v1/sessions/{id}/turns");
        let body = serde_json::json!({ "message": text });
        tokio::spawn(async move { send(&router, "POST", &uri, Some(body)).await })
    }

    #[tokio::test]
    async fn test_turns_on_one_session_run_one_at_a_time() {
        let gate = Arc::new(Notify::new());
        let entered = Arc::new(Notify::new());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let provider = GatedProvider {
            gate: gate.clone(),
            entered: entered.clone(),
            requests: requests.clone(),
            capabilities: ProviderCapabilities {
                max_context_tokens: 3900,
            },
        };
        let router = build_router(AppState::new(
            BoxLlmProvider::new(provider),
            AppConfig::default(),
        ));

        let busy = create(&router, None).await;
        let other = create(&router, None).await;

        let first = spawn_turn(&router, &busy, "hold");
        entered.notified().await;
        let second = spawn_turn(&router, &busy, "after");

        // A different session is answered while `busy` is still mid-call.
        let (status, value) = tokio::time::timeout(
            Duration::from_secs(5),
            send(
                &router,
                "POST",
                &format!("/api/v1/sessions/{other}/turns"),
                Some(serde_json::json!({"message": "elsewhere"})),
            ),
        )
        .await
        .expect("other session waited on the busy one");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["data"]["reply"], "re: elsewhere");
        assert!(!first.is_finished());
        assert_eq!(requests.lock().unwrap().len(), 2);

        gate.notify_one();
        let (status, value) = first.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["data"]["reply"], "re: hold");
        let (status, value) = second.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["data"]["reply"], "re: after");

        // The queued turn saw the first turn's full exchange.
        let sent = requests.lock().unwrap().clone();
        let after = sent
            .iter()
            .find(|messages| messages.last().map(String::as_str) == Some("after"))
            .unwrap();
        assert_eq!(&after[1..], &["hold", "re: hold", "after"]);

        let (_, value) = send(&router, "GET", &format!("/api/v1/sessions/{busy}/messages"), None).await;
        let contents: Vec<&str> = value["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents, vec!["hold", "re: hold", "after", "re: after"]);
    }
}
