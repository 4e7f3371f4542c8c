//! Conversational endpoint backed by the knowledge agent.

use axum::{extract::State, response::Response, routing::post};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    ai::{ConversationTurn, ExecutedToolCall},
    app::AppContext,
    controller::{format, JsonValidate, Routes},
    threads::ThreadError,
    Error, Result,
};

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    /// Continues this thread; a new one is created when absent.
    #[serde(default)]
    pub thread_id: Option<Uuid>,
    #[validate(length(min = 1, message = "message must not be empty"))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub thread_id: Uuid,
    pub reply: String,
    pub tool_calls: Vec<ExecutedToolCall>,
}

/// Runs one conversational turn.
///
/// The thread only records the exchange once the agent has answered, so a
/// failed turn leaves it untouched.
///
/// # Errors
/// `404` for an unknown thread, `400` for an empty message and `502` when the
/// model fails.
pub async fn send(
    State(ctx): State<AppContext>,
    JsonValidate(payload): JsonValidate<ChatRequest>,
) -> Result<Response> {
    if payload.message.trim().is_empty() {
        return Err(Error::BadRequest("message must not be empty".to_string()));
    }

    let history = match payload.thread_id {
        Some(id) => ctx
            .threads
            .load(&id)
            .ok_or(ThreadError::NotFound(id))?
            .history(),
        None => Vec::new(),
    };

    let answer = ctx.agent.respond(&history, &payload.message).await?;

    let turns = vec![
        ConversationTurn::user(payload.message),
        ConversationTurn::assistant(answer.reply.clone()),
    ];
    let thread = match payload.thread_id {
        Some(id) => ctx.threads.append(&id, turns)?,
        None => ctx.threads.start(turns),
    };

    tracing::info!(
        thread_id = %thread.id,
        messages = thread.messages.len(),
        tool_calls = answer.tool_calls.len(),
        "chat_turn_completed"
    );

    format::json(ChatResponse {
        thread_id: thread.id,
        reply: answer.reply,
        tool_calls: answer.tool_calls,
    })
}

pub fn routes() -> Routes {
    Routes::new().prefix("/api").add("/chat", post(send))
}
