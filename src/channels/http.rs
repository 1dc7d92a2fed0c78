//! HTTP chat API — a thin axum frontend over the engine.
//!
//! Routes:
//! - `POST /api/chat` — run one turn: `{thread_id?, message}` → `{thread_id, reply}`
//! - `GET /api/history/{thread_id}` — persisted message history
//! - `GET /api/threads` — known thread ids
//! - `GET /health`

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::agent::ConversationEngine;
use crate::error::Error;
use crate::llm::ChatMessage;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Omitted for a fresh conversation; a new id is generated.
    pub thread_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub thread_id: String,
    pub reply: String,
}

/// Build the chat API router.
pub fn chat_routes(engine: Arc<ConversationEngine>) -> Router {
    Router::new()
        .route("/api/chat", post(post_chat))
        .route("/api/history/{thread_id}", get(get_history))
        .route("/api/threads", get(get_threads))
        .route("/health", get(|| async { "ok" }))
        .layer(CorsLayer::permissive())
        .with_state(engine)
}

/// Map engine errors onto HTTP statuses: upstream trouble is a bad
/// gateway, anything else is internal.
fn error_response(err: Error) -> Response {
    let status = match err {
        Error::Llm(_) => StatusCode::BAD_GATEWAY,
        Error::Tool(_) | Error::Engine(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::error!(error = %err, "Chat request failed");
    (status, err.to_string()).into_response()
}

async fn post_chat(
    State(engine): State<Arc<ConversationEngine>>,
    axum::Json(request): axum::Json<ChatRequest>,
) -> Response {
    if request.message.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "message must not be empty").into_response();
    }

    let thread_id = request
        .thread_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    match engine.run_turn(&thread_id, &request.message).await {
        Ok(result) => axum::Json(ChatResponse {
            thread_id,
            reply: result.reply.content,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn get_history(
    State(engine): State<Arc<ConversationEngine>>,
    Path(thread_id): Path<String>,
) -> Response {
    match engine.store().load(&thread_id).await {
        Ok(messages) => axum::Json::<Vec<ChatMessage>>(messages).into_response(),
        Err(e) => error_response(e.into()),
    }
}

async fn get_threads(State(engine): State<Arc<ConversationEngine>>) -> Response {
    match engine.store().list_threads().await {
        Ok(threads) => axum::Json(threads).into_response(),
        Err(e) => error_response(e.into()),
    }
}
