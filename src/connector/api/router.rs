use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use crate::domain::{ChatInput, Conversation, ConversationSummary, Message, MessageRequestedResponse};

use super::container::Container;
use super::controller::{ChatController, ConversationController, MessageController};
use super::error::ApiError;

type AppState = Arc<Container>;

/// HTTP surface of the relay.
pub struct Router {
    container: Arc<Container>,
}

impl Router {
    pub fn new(container: Arc<Container>) -> Self {
        Self { container }
    }

    /// Routes are served both at the root and under `/api`.
    pub fn build(self) -> axum::Router {
        let routes = axum::Router::new()
            .route("/health", get(health))
            .route("/chat", post(submit_chat))
            .route("/conversation", post(submit_chat))
            .route("/conversations", get(list_conversations))
            .route("/conversation/{id}", get(get_conversation))
            .route("/conversation/{conversation_id}/{message_id}", get(get_message))
            .route("/message/{conversation_id}/{message_id}", get(wait_for_message));

        axum::Router::new()
            .nest("/api", routes.clone())
            .merge(routes)
            .with_state(self.container)
    }

    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Listening on http://{}", listener.local_addr()?);
        axum::serve(listener, self.build()).await?;
        Ok(())
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn submit_chat(
    State(container): State<AppState>,
    body: Result<Json<ChatInput>, JsonRejection>,
) -> Result<Json<MessageRequestedResponse>, ApiError> {
    let Json(input) = body.map_err(|e| ApiError::invalid_input(e.body_text()))?;
    let requested = ChatController::new(&container).submit(input).await?;
    Ok(Json(requested))
}

async fn list_conversations(
    State(container): State<AppState>,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    Ok(Json(ConversationController::new(&container).list().await?))
}

async fn get_conversation(
    State(container): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    Ok(Json(ConversationController::new(&container).get(&id).await?))
}

async fn get_message(
    State(container): State<AppState>,
    Path((conversation_id, message_id)): Path<(String, String)>,
) -> Result<Json<Message>, ApiError> {
    let message = MessageController::new(&container)
        .get(&conversation_id, &message_id)
        .await?;
    Ok(Json(message))
}

async fn wait_for_message(
    State(container): State<AppState>,
    Path((conversation_id, message_id)): Path<(String, String)>,
) -> Result<Json<Message>, ApiError> {
    let message = MessageController::new(&container)
        .wait(&conversation_id, &message_id)
        .await?;
    Ok(Json(message))
}
