//! Registration
//!
//! `POST /api/register`

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::request::RegisterRequest;
use crate::models::response::RegisterResponse;
use crate::services::Registration;
use crate::state::AppState;
use crate::utils::error::AppError;

fn reply(status: StatusCode, message: impl Into<String>, user_id: Option<String>) -> Response {
    (
        status,
        Json(RegisterResponse {
            message: message.into(),
            user_id,
        }),
    )
        .into_response()
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Response {
    let accounts = state.accounts().clone();
    // password hashing is CPU bound
    let outcome = tokio::task::spawn_blocking(move || accounts.register(request))
        .await
        .map_err(|e| AppError::internal(format!("registration task failed: {}", e)))
        .and_then(|result| result);

    match outcome {
        Ok(Registration::Created { user_id }) => {
            reply(StatusCode::CREATED, "User created successfully", Some(user_id))
        }
        Ok(Registration::AlreadyExists) => {
            reply(StatusCode::BAD_REQUEST, "User already exists", None)
        }
        Err(AppError::Validation(message)) => reply(StatusCode::BAD_REQUEST, message, None),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{body_json, state};
    use serde_json::json;

    fn request(email: &str) -> Json<RegisterRequest> {
        Json(RegisterRequest {
            name: "Ada".into(),
            email: email.into(),
            password: "hunter22".into(),
            prompt: Some("a pistachio coffee shop".into()),
        })
    }

    #[tokio::test]
    async fn test_register_then_duplicate() {
        let (state, _) = state(&[], &[]);

        let response = register(State(state.clone()), request("ada@example.com")).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["message"], "User created successfully");
        assert!(body["userId"].is_string());

        let response = register(State(state), request("ada@example.com")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "User already exists" })
        );
    }

    #[tokio::test]
    async fn test_invalid_email_is_400() {
        let (state, _) = state(&[], &[]);
        let response = register(State(state), request("nobody")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
