//! Analysis Records
//!
//! The persisted result of a completed workflow run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use noviq_core::{AnalysisPayload, AnswerSet};

/// One stored analysis. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: Option<String>,
    pub business_idea: String,
    pub answers: AnswerSet,
    pub analysis: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Everything a record needs except the server-assigned id and timestamp
#[derive(Debug, Clone)]
pub struct AnalysisRecordInput {
    pub user_id: Option<String>,
    pub business_idea: String,
    pub answers: AnswerSet,
    pub analysis: AnalysisPayload,
}
