//! AI Completion Proxy
//!
//! `POST /api/ai`: stage-agnostic. The system prompt decides which schema
//! the reply follows; the caller validates it.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::models::request::CompletionRequest;
use crate::services::prompts::idea_message;
use crate::services::ResponseTier;
use crate::state::AppState;
use crate::utils::error::AppError;

pub async fn complete(
    State(state): State<AppState>,
    Json(request): Json<CompletionRequest>,
) -> Response {
    if request.prompt.trim().is_empty() {
        return AppError::validation("prompt is required").into_response();
    }

    let message = idea_message(&request.prompt);
    match state
        .gateway()
        .complete(ResponseTier::Brief, &message, &request.system_prompt)
        .await
    {
        Ok(payload) => Json(payload).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "AI request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to process AI request",
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
