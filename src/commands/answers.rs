//! Combined Submission
//!
//! `POST /api/answers`: final analysis and store write in one round trip.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::models::request::SubmitAnswersRequest;
use crate::models::response::SubmissionResponse;
use crate::state::AppState;
use crate::utils::error::AppError;

pub async fn submit_answers(
    State(state): State<AppState>,
    Json(request): Json<SubmitAnswersRequest>,
) -> Response {
    let user_id = request.user_id.filter(|id| !id.trim().is_empty());
    match state
        .submissions()
        .submit(request.prompt, request.answers, user_id)
        .await
    {
        Ok(analysis) => Json(SubmissionResponse {
            success: true,
            analysis: analysis.into_value(),
        })
        .into_response(),
        Err(e @ AppError::Validation(_)) => e.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "submission failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Failed to process answers: {}", e) })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{body_json, state};
    use noviq_core::AnswerSet;

    fn request(answers: serde_json::Value) -> Json<SubmitAnswersRequest> {
        Json(
            serde_json::from_value(json!({
                "prompt": "tea bar",
                "answers": answers,
                "userId": "u1",
            }))
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_success_returns_analysis_and_stores_it() {
        let analysis = r#"{"executive_summary":{"viability_score":55,"headline":"Decent"}}"#;
        let (state, _) = state(&[], &[analysis]);
        let response = submit_answers(
            State(state.clone()),
            request(json!({ "q1": { "question": "Who?", "selected": "Students" } })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["analysis"]["executive_summary"]["headline"], "Decent");
        assert_eq!(state.analyses().get_all(Some("u1")).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_model_failure_is_500_with_prefix() {
        let (state, _) = state(&[], &["not json"]);
        let response = submit_answers(
            State(state.clone()),
            request(json!({ "q1": { "question": "Who?", "selected": "Students" } })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to process answers: "));
        assert!(state.analyses().get_all(Some("u1")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_answers_rejected() {
        let (state, _) = state(&[], &[]);
        let response = submit_answers(
            State(state),
            request(serde_json::to_value(AnswerSet::new()).unwrap()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
