use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    error::{AppError, INVALID_BODY, MISSING_MESSAGE},
    message::{ChatRequest, ChatResponse},
    services::{prompt::build_prompt, retry::generate_with_retry},
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(payload) = body.map_err(|rejection| {
        tracing::debug!(status = %rejection.status(), detail = %rejection.body_text(), "unreadable chat body");
        AppError::Validation(INVALID_BODY.to_string())
    })?;

    let message = payload
        .message_text()
        .ok_or_else(|| AppError::Validation(MISSING_MESSAGE.to_string()))?;

    // No network work starts without a credential.
    let generator = state
        .generator
        .as_ref()
        .ok_or_else(|| AppError::Configuration("GEMINI_API_KEY is not set".to_string()))?;

    let prompt = build_prompt(
        message,
        &payload.history,
        payload.unit.as_deref(),
        payload.topic.as_deref(),
        &state.chat.history,
    );

    tracing::info!(
        history_len = payload.history.len(),
        prompt_chars = prompt.len(),
        "forwarding chat message upstream"
    );

    let deadline = state.chat.deadline;
    let reply = tokio::time::timeout(
        deadline,
        generate_with_retry(&**generator, &prompt, &state.chat.retry),
    )
    .await
    .map_err(|_| AppError::DeadlineExceeded(deadline))??;

    Ok(Json(ChatResponse { reply }))
}
