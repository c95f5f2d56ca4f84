//! Response Types
//!
//! Success/failure envelopes returned by the HTTP endpoints.

use serde::{Deserialize, Serialize};

use super::analysis::AnalysisRecord;

/// `{success, analysis}` or `{success:false, message}` for the latest-analysis fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestAnalysisResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LatestAnalysisResponse {
    pub fn found(analysis: AnalysisRecord) -> Self {
        Self {
            success: true,
            analysis: Some(analysis),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            analysis: None,
            message: Some(message.into()),
        }
    }
}

/// Dashboard-only flags describing the shape of a stored analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDebug {
    pub has_analysis: bool,
    pub has_offline_analysis: bool,
    pub has_summary: bool,
}

impl AnalysisDebug {
    pub fn inspect(analysis: &serde_json::Value) -> Self {
        let has_analysis = analysis.as_object().is_some_and(|o| !o.is_empty());
        let offline = analysis.get("offline_analysis");
        Self {
            has_analysis,
            has_offline_analysis: offline.is_some(),
            has_summary: offline
                .and_then(|o| o.get("executive_summary"))
                .or_else(|| analysis.get("executive_summary"))
                .is_some(),
        }
    }
}

/// A stored record plus its `_debug` annotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardEntry {
    #[serde(flatten)]
    pub record: AnalysisRecord,
    #[serde(rename = "_debug")]
    pub debug: AnalysisDebug,
}

impl From<AnalysisRecord> for DashboardEntry {
    fn from(record: AnalysisRecord) -> Self {
        let debug = AnalysisDebug::inspect(&record.analysis);
        Self { record, debug }
    }
}

/// `{success:true, analyses:[...]}`; `error` is set when a read failure was
/// degraded to an empty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisListResponse {
    pub success: bool,
    pub analyses: Vec<DashboardEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisListResponse {
    pub fn ok(analyses: Vec<DashboardEntry>) -> Self {
        Self {
            success: true,
            analyses,
            error: None,
        }
    }

    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            success: true,
            analyses: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Combined submit result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub analysis: serde_json::Value,
}

/// `{message}` (+ `userId` on success) for registration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
    pub database: bool,
    pub gateway: bool,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            service: "noviq".to_string(),
            database: false,
            gateway: false,
        }
    }
}
