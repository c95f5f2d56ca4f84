//! Analysis Reads
//!
//! `GET /api/analyses` returns the newest record for a user and
//! `GET /api/analyses/all` lists them for the dashboard. Neither answers
//! with an HTTP error; failures are reported in the envelope.

use axum::extract::{Query, State};
use axum::Json;

use crate::models::request::UserQuery;
use crate::models::response::{AnalysisListResponse, DashboardEntry, LatestAnalysisResponse};
use crate::state::AppState;

const NO_ANALYSIS: &str = "No analysis found";
const FETCH_FAILED: &str = "Error fetching analysis";

pub async fn latest_analysis(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Json<LatestAnalysisResponse> {
    let Some(user_id) = query.user_id() else {
        return Json(LatestAnalysisResponse::failure(NO_ANALYSIS));
    };

    Json(match state.analyses().get_latest(user_id) {
        Ok(Some(record)) => LatestAnalysisResponse::found(record),
        Ok(None) => LatestAnalysisResponse::failure(NO_ANALYSIS),
        Err(e) => {
            tracing::error!(error = %e, "failed to read latest analysis");
            LatestAnalysisResponse::failure(FETCH_FAILED)
        }
    })
}

pub async fn all_analyses(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Json<AnalysisListResponse> {
    Json(match state.analyses().get_all(query.user_id()) {
        Ok(records) => {
            tracing::debug!(count = records.len(), "listing analyses");
            AnalysisListResponse::ok(records.into_iter().map(DashboardEntry::from).collect())
        }
        Err(e) => {
            tracing::warn!(error = %e, "analysis list degraded to empty");
            AnalysisListResponse::degraded(e.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use crate::models::analysis::AnalysisRecordInput;
    use crate::services::gateway::mock::ScriptedProvider;
    use crate::services::AiGateway;
    use crate::storage::Database;
    use noviq_core::{AnalysisPayload, AnswerSet};
    use serde_json::json;
    use std::sync::Arc;

    fn query(user_id: Option<&str>) -> Query<UserQuery> {
        Query(UserQuery {
            user_id: user_id.map(str::to_string),
        })
    }

    fn save(state: &AppState, user_id: &str, idea: &str) {
        state
            .analyses()
            .save(AnalysisRecordInput {
                user_id: Some(user_id.into()),
                business_idea: idea.into(),
                answers: AnswerSet::new(),
                analysis: AnalysisPayload::from_value(json!({
                    "offline_analysis": {
                        "executive_summary": { "viability_score": 40, "headline": idea }
                    }
                }))
                .unwrap(),
            })
            .unwrap();
    }

    #[tokio::test]
    async fn test_all_without_user_is_empty_success() {
        let (state, _) = testing::state(&[], &[]);
        save(&state, "u1", "tea bar");
        let Json(response) = all_analyses(State(state), query(None)).await;
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({ "success": true, "analyses": [] })
        );
    }

    #[tokio::test]
    async fn test_all_annotates_debug_flags() {
        let (state, _) = testing::state(&[], &[]);
        save(&state, "u1", "tea bar");
        save(&state, "u1", "bike repair");
        let Json(response) = all_analyses(State(state), query(Some("u1"))).await;
        let value = serde_json::to_value(response).unwrap();

        assert_eq!(value["analyses"].as_array().unwrap().len(), 2);
        assert_eq!(value["analyses"][0]["businessIdea"], "bike repair");
        assert_eq!(
            value["analyses"][0]["_debug"],
            json!({ "hasAnalysis": true, "hasOfflineAnalysis": true, "hasSummary": true })
        );
    }

    #[tokio::test]
    async fn test_all_degrades_on_storage_failure() {
        let db = Database::new_in_memory().unwrap();
        let gateway = AiGateway::new(
            Arc::new(ScriptedProvider::replying("haiku", &[])),
            Arc::new(ScriptedProvider::replying("sonnet", &[])),
        );
        let state = AppState::new(db.clone(), gateway);
        db.get_connection()
            .unwrap()
            .execute_batch("DROP TABLE analyses")
            .unwrap();

        let Json(response) = all_analyses(State(state), query(Some("u1"))).await;
        assert!(response.success);
        assert!(response.analyses.is_empty());
        assert!(response.error.is_some());
    }

    #[tokio::test]
    async fn test_latest() {
        let (state, _) = testing::state(&[], &[]);
        let Json(missing) = latest_analysis(State(state.clone()), query(Some("u1"))).await;
        assert!(!missing.success);
        assert_eq!(missing.message.as_deref(), Some(NO_ANALYSIS));

        save(&state, "u1", "tea bar");
        save(&state, "u1", "bike repair");
        let Json(found) = latest_analysis(State(state.clone()), query(Some("u1"))).await;
        assert!(found.success);
        assert_eq!(found.analysis.unwrap().business_idea, "bike repair");

        let Json(anonymous) = latest_analysis(State(state), query(Some(""))).await;
        assert!(!anonymous.success);
    }
}
