//! Stage Schemas
//!
//! Typed views over the JSON documents each stage's LLM reply is expected to
//! contain. Replies are untrusted: every `from_value` constructor checks field
//! presence, array lengths and option counts before anything downstream sees
//! the data.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};

/// Feedback items a well-behaved stage-1 reply carries.
pub const EXPECTED_FEEDBACK_ITEMS: usize = 4;
pub const MIN_QUESTIONS: usize = 3;
pub const MAX_QUESTIONS: usize = 5;
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 5;

// ============================================================================
// Stage 1: feedback
// ============================================================================

/// Stage-1 reply: short encouragement strings shown one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackBatch {
    pub feedback: Vec<String>,
    /// Parsed for completeness; questions are fetched regardless.
    #[serde(default)]
    pub needs_more_info: bool,
}

impl FeedbackBatch {
    pub fn from_value(value: Value) -> CoreResult<Self> {
        let batch: FeedbackBatch = serde_json::from_value(value)
            .map_err(|e| CoreError::parse(format!("feedback reply: {}", e)))?;
        batch.validate()?;
        Ok(batch)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.feedback.is_empty() {
            return Err(CoreError::validation("feedback reply contained no items"));
        }
        if let Some(pos) = self.feedback.iter().position(|f| f.trim().is_empty()) {
            return Err(CoreError::validation(format!(
                "feedback item {} is blank",
                pos + 1
            )));
        }
        if self.feedback.len() != EXPECTED_FEEDBACK_ITEMS {
            tracing::warn!(
                count = self.feedback.len(),
                expected = EXPECTED_FEEDBACK_ITEMS,
                "feedback reply has an unexpected item count"
            );
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.feedback.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feedback.is_empty()
    }
}

// ============================================================================
// Stage 2: follow-up questions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    TargetMarket,
    RevenueModel,
    UniqueValue,
    ResourcesNeeded,
    PersonalFit,
}

impl QuestionCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::TargetMarket => "Target market",
            Self::RevenueModel => "Revenue model",
            Self::UniqueValue => "Unique value",
            Self::ResourcesNeeded => "Resources needed",
            Self::PersonalFit => "Personal fit",
        }
    }
}

/// One multiple-choice question from the stage-2 batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpQuestion {
    pub id: String,
    #[serde(rename = "question")]
    pub question_text: String,
    pub category: QuestionCategory,
    pub options: Vec<String>,
}

impl FollowUpQuestion {
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    fn validate(&self) -> CoreResult<()> {
        if self.id.trim().is_empty() {
            return Err(CoreError::validation("question id is empty"));
        }
        if self.question_text.trim().is_empty() {
            return Err(CoreError::validation(format!(
                "question {} has no text",
                self.id
            )));
        }
        let count = self.options.len();
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&count) {
            return Err(CoreError::validation(format!(
                "question {} has {} options, expected {}-{}",
                self.id, count, MIN_OPTIONS, MAX_OPTIONS
            )));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(CoreError::validation(format!(
                "question {} has a blank option",
                self.id
            )));
        }
        Ok(())
    }
}

/// Stage-2 reply. Produced once per workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBatch {
    pub questions: Vec<FollowUpQuestion>,
}

impl QuestionBatch {
    pub fn from_value(value: Value) -> CoreResult<Self> {
        let batch: QuestionBatch = serde_json::from_value(value)
            .map_err(|e| CoreError::parse(format!("questions reply: {}", e)))?;
        batch.validate()?;
        Ok(batch)
    }

    pub fn validate(&self) -> CoreResult<()> {
        let count = self.questions.len();
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&count) {
            return Err(CoreError::validation(format!(
                "questions reply has {} questions, expected {}-{}",
                count, MIN_QUESTIONS, MAX_QUESTIONS
            )));
        }
        let mut seen = HashSet::new();
        for question in &self.questions {
            question.validate()?;
            if !seen.insert(question.id.as_str()) {
                return Err(CoreError::validation(format!(
                    "duplicate question id {}",
                    question.id
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&FollowUpQuestion> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(|q| q.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

// ============================================================================
// Stage 3: final analysis
// ============================================================================

/// The headline numbers every analysis must carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub viability_score: f64,
    pub headline: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_points: Vec<String>,
}

/// Stage-3 reply, kept as the opaque object the dashboard renders.
///
/// Only the executive summary is checked; chart sub-structures pass through
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisPayload(Value);

impl AnalysisPayload {
    pub fn from_value(value: Value) -> CoreResult<Self> {
        if !value.is_object() {
            return Err(CoreError::parse("analysis reply is not a JSON object"));
        }
        let payload = Self(value);
        let summary = payload.executive_summary()?;
        if !(0.0..=100.0).contains(&summary.viability_score) {
            return Err(CoreError::validation(format!(
                "viability_score {} is outside 0-100",
                summary.viability_score
            )));
        }
        if summary.headline.trim().is_empty() {
            return Err(CoreError::validation("executive summary headline is empty"));
        }
        Ok(payload)
    }

    /// Locate and decode the executive summary, preferring the
    /// `offline_analysis` wrapper the dashboard reads.
    pub fn executive_summary(&self) -> CoreResult<ExecutiveSummary> {
        let raw = self
            .0
            .pointer("/offline_analysis/executive_summary")
            .or_else(|| self.0.get("executive_summary"))
            .ok_or_else(|| CoreError::validation("analysis has no executive_summary"))?;
        serde_json::from_value(raw.clone())
            .map_err(|e| CoreError::parse(format!("executive_summary: {}", e)))
    }

    pub fn has_offline_analysis(&self) -> bool {
        self.0.get("offline_analysis").is_some()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(id: &str, options: usize) -> Value {
        json!({
            "id": id,
            "question": format!("Question {}?", id),
            "category": "target_market",
            "options": (0..options).map(|i| format!("Option {}", i)).collect::<Vec<_>>(),
        })
    }

    #[test]
    fn test_feedback_batch_accepts_four_items() {
        let batch = FeedbackBatch::from_value(json!({
            "feedback": ["Great location", "Strong niche", "Clear audience", "Good timing"],
            "needsMoreInfo": false
        }))
        .unwrap();
        assert_eq!(batch.len(), 4);
        assert!(!batch.needs_more_info);
    }

    #[test]
    fn test_feedback_batch_tolerates_other_counts() {
        let batch = FeedbackBatch::from_value(json!({ "feedback": ["Only one"] })).unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_feedback_batch_rejects_empty_and_blank() {
        assert!(FeedbackBatch::from_value(json!({ "feedback": [] })).is_err());
        assert!(FeedbackBatch::from_value(json!({ "feedback": ["ok", "  "] })).is_err());
        assert!(matches!(
            FeedbackBatch::from_value(json!({ "items": ["x"] })),
            Err(CoreError::Parse(_))
        ));
    }

    #[test]
    fn test_question_batch_valid() {
        let batch = QuestionBatch::from_value(json!({
            "questions": [question("q1", 4), question("q2", 2), question("q3", 5)]
        }))
        .unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.ids().collect::<Vec<_>>(), vec!["q1", "q2", "q3"]);
        assert_eq!(batch.get("q2").unwrap().options.len(), 2);
        assert_eq!(batch.questions[0].category, QuestionCategory::TargetMarket);
    }

    #[test]
    fn test_question_batch_option_bounds() {
        let one_option = json!({
            "questions": [question("q1", 1), question("q2", 3), question("q3", 3)]
        });
        assert!(QuestionBatch::from_value(one_option).is_err());

        let six_options = json!({
            "questions": [question("q1", 6), question("q2", 3), question("q3", 3)]
        });
        assert!(QuestionBatch::from_value(six_options).is_err());
    }

    #[test]
    fn test_question_batch_count_bounds() {
        let two = json!({ "questions": [question("q1", 3), question("q2", 3)] });
        assert!(QuestionBatch::from_value(two).is_err());

        let six: Vec<Value> = (1..=6).map(|i| question(&format!("q{}", i), 3)).collect();
        assert!(QuestionBatch::from_value(json!({ "questions": six })).is_err());
    }

    #[test]
    fn test_question_batch_duplicate_ids() {
        let dup = json!({
            "questions": [question("q1", 3), question("q1", 3), question("q3", 3)]
        });
        let err = QuestionBatch::from_value(dup).unwrap_err();
        assert!(err.to_string().contains("duplicate question id q1"));
    }

    #[test]
    fn test_question_batch_unknown_category() {
        let mut q = question("q1", 3);
        q["category"] = json!("weather");
        let batch = json!({ "questions": [q, question("q2", 3), question("q3", 3)] });
        assert!(matches!(
            QuestionBatch::from_value(batch),
            Err(CoreError::Parse(_))
        ));
    }

    #[test]
    fn test_analysis_payload_nested_summary() {
        let payload = AnalysisPayload::from_value(json!({
            "offline_analysis": {
                "executive_summary": {
                    "viability_score": 72,
                    "headline": "Promising niche cafe",
                    "key_points": ["Tourist foot traffic"]
                },
                "swot": { "strengths": ["Unique product"] }
            }
        }))
        .unwrap();
        let summary = payload.executive_summary().unwrap();
        assert_eq!(summary.viability_score, 72.0);
        assert_eq!(summary.headline, "Promising niche cafe");
        assert!(payload.has_offline_analysis());
        assert_eq!(
            payload.as_value()["offline_analysis"]["swot"]["strengths"][0],
            "Unique product"
        );
    }

    #[test]
    fn test_analysis_payload_top_level_summary() {
        let payload = AnalysisPayload::from_value(json!({
            "executive_summary": { "viability_score": 0, "headline": "Weak" }
        }))
        .unwrap();
        assert!(!payload.has_offline_analysis());
    }

    #[test]
    fn test_analysis_payload_rejections() {
        assert!(AnalysisPayload::from_value(json!([1, 2])).is_err());
        assert!(AnalysisPayload::from_value(json!({ "swot": {} })).is_err());
        assert!(AnalysisPayload::from_value(json!({
            "executive_summary": { "viability_score": 140, "headline": "Too good" }
        }))
        .is_err());
        assert!(AnalysisPayload::from_value(json!({
            "executive_summary": { "viability_score": 50, "headline": "" }
        }))
        .is_err());
    }
}
