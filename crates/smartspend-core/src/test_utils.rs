//! Test utilities for smartspend-core
//!
//! A mock OpenAI-compatible completion server, so the real HTTP client can
//! be exercised end-to-end without network access.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::ai::MOCK_RECOMMENDATION;

/// How the mock server answers chat completions
#[derive(Debug, Clone)]
pub struct ServerBehavior {
    /// Assistant message content
    pub content: String,
    /// HTTP status for chat completions
    pub status: StatusCode,
    /// Delay before answering
    pub delay: Option<Duration>,
}

impl Default for ServerBehavior {
    fn default() -> Self {
        Self {
            content: MOCK_RECOMMENDATION.to_string(),
            status: StatusCode::OK,
            delay: None,
        }
    }
}

impl ServerBehavior {
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

struct ServerState {
    behavior: ServerBehavior,
    requests: Mutex<Vec<Value>>,
}

/// Mock completion server for testing and development
pub struct MockCompletionServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockCompletionServer {
    /// Start a server answering with a valid recommendation
    pub async fn start() -> Self {
        Self::start_with(ServerBehavior::default()).await
    }

    /// Start the mock server on an available port
    pub async fn start_with(behavior: ServerBehavior) -> Self {
        let state = Arc::new(ServerState {
            behavior,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Chat completion request bodies received so far
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockCompletionServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_models() -> Json<Value> {
    Json(json!({
        "object": "list",
        "data": [{"id": "mock-model", "object": "model", "owned_by": "smartspend"}]
    }))
}

async fn handle_chat(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<Value>,
) -> Response {
    state.requests.lock().unwrap().push(body.clone());

    let behavior = &state.behavior;
    if let Some(delay) = behavior.delay {
        tokio::time::sleep(delay).await;
    }

    if !behavior.status.is_success() {
        return (behavior.status, "mock failure").into_response();
    }

    let model = body
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or("mock-model");

    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": behavior.content},
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}
