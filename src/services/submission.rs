//! Combined Submission
//!
//! Final-analysis call followed by the store write, as one operation. A
//! record is written only after the reply parsed and passed validation.

use noviq_core::{AnalysisPayload, AnswerSet};

use super::analysis_store::AnalysisStore;
use super::gateway::{AiGateway, ResponseTier};
use super::prompts::{analysis_message, ANALYSIS_INSTRUCTION};
use crate::models::analysis::AnalysisRecordInput;
use crate::utils::error::{AppError, AppResult};

#[derive(Clone)]
pub struct SubmissionService {
    gateway: AiGateway,
    store: AnalysisStore,
}

impl SubmissionService {
    pub fn new(gateway: AiGateway, store: AnalysisStore) -> Self {
        Self { gateway, store }
    }

    pub async fn submit(
        &self,
        prompt: String,
        answers: AnswerSet,
        user_id: Option<String>,
    ) -> AppResult<AnalysisPayload> {
        if prompt.trim().is_empty() {
            return Err(AppError::validation("prompt is required"));
        }
        if answers.is_empty() {
            return Err(AppError::validation("answers are required"));
        }

        let message = analysis_message(&prompt, &answers)?;
        let reply = self
            .gateway
            .complete(ResponseTier::Extended, &message, ANALYSIS_INSTRUCTION)
            .await?;
        let analysis = AnalysisPayload::from_value(reply)?;

        let id = self.store.save(AnalysisRecordInput {
            user_id,
            business_idea: prompt,
            answers,
            analysis: analysis.clone(),
        })?;
        tracing::debug!(id = %id, "submission complete");

        Ok(analysis)
    }
}
