//! Workflow API Client
//!
//! The controller's view of the service: one call per stage. Replies are
//! validated against the stage schemas here, before they reach the reducer.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use noviq_core::{AnalysisPayload, AnswerSet, FeedbackBatch, IdeaPrompt, QuestionBatch};

use crate::services::prompts::{FEEDBACK_INSTRUCTION, QUESTIONS_INSTRUCTION};
use crate::utils::error::{AppError, AppResult};

#[async_trait]
pub trait WorkflowApi: Send + Sync {
    /// Stage 1
    async fn fetch_feedback(&self, prompt: &IdeaPrompt) -> AppResult<FeedbackBatch>;

    /// Stage 2
    async fn fetch_questions(&self, prompt: &IdeaPrompt) -> AppResult<QuestionBatch>;

    /// Stage 3: analyze and store in one round trip
    async fn submit(&self, prompt: &IdeaPrompt, answers: &AnswerSet) -> AppResult<AnalysisPayload>;
}

/// Talks to a running `noviq-server` over HTTP.
pub struct HttpWorkflowApi {
    client: reqwest::Client,
    base_url: String,
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

impl ErrorBody {
    fn describe(self) -> Option<String> {
        let summary = self.error.or(self.message)?;
        Some(match self.details {
            Some(details) => format!("{}: {}", summary, details),
            None => summary,
        })
    }
}

#[derive(Deserialize)]
struct SubmitBody {
    success: bool,
    analysis: Option<Value>,
}

impl HttpWorkflowApi {
    pub fn new(base_url: impl Into<String>, user_id: Option<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id,
        })
    }

    async fn post(&self, path: &str, body: Value) -> AppResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "workflow request");
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(ErrorBody::describe)
                .unwrap_or_else(|| format!("HTTP {}", status));
            tracing::warn!(status = status.as_u16(), url = %url, "workflow request failed");
            return Err(AppError::upstream(message));
        }

        serde_json::from_str(&text)
            .map_err(|e| AppError::malformed(format!("{} returned invalid JSON: {}", path, e)))
    }

    async fn complete(&self, prompt: &IdeaPrompt, system_prompt: &str) -> AppResult<Value> {
        self.post(
            "/api/ai",
            json!({ "prompt": prompt.as_str(), "systemPrompt": system_prompt }),
        )
        .await
    }
}

#[async_trait]
impl WorkflowApi for HttpWorkflowApi {
    async fn fetch_feedback(&self, prompt: &IdeaPrompt) -> AppResult<FeedbackBatch> {
        let value = self.complete(prompt, FEEDBACK_INSTRUCTION).await?;
        Ok(FeedbackBatch::from_value(value)?)
    }

    async fn fetch_questions(&self, prompt: &IdeaPrompt) -> AppResult<QuestionBatch> {
        let value = self.complete(prompt, QUESTIONS_INSTRUCTION).await?;
        Ok(QuestionBatch::from_value(value)?)
    }

    async fn submit(&self, prompt: &IdeaPrompt, answers: &AnswerSet) -> AppResult<AnalysisPayload> {
        let value = self
            .post(
                "/api/answers",
                json!({
                    "prompt": prompt.as_str(),
                    "answers": answers,
                    "userId": self.user_id,
                }),
            )
            .await?;
        let body: SubmitBody = serde_json::from_value(value)
            .map_err(|e| AppError::malformed(format!("unexpected submit reply: {}", e)))?;
        match (body.success, body.analysis) {
            (true, Some(analysis)) => Ok(AnalysisPayload::from_value(analysis)?),
            _ => Err(AppError::malformed("submit reply carried no analysis")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let api = HttpWorkflowApi::new("http://localhost:3000/", None).unwrap();
        assert_eq!(api.base_url, "http://localhost:3000");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let api = HttpWorkflowApi::new("http://127.0.0.1:9", None).unwrap();
        let prompt = IdeaPrompt::new("tea bar").unwrap();
        let err = api.fetch_feedback(&prompt).await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }
}
