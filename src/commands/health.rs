//! Health Check
//!
//! `GET /api/health`

use axum::extract::State;
use axum::Json;

use crate::models::response::HealthResponse;
use crate::state::AppState;

/// Report service status; degraded when no pooled connection is available
/// or either model tier is unusable.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut health = HealthResponse::default();
    health.database = state.is_database_healthy();
    health.gateway = match state.gateway().health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "AI gateway is not usable");
            false
        }
    };
    health.status = if health.database && health.gateway {
        "healthy".to_string()
    } else {
        "degraded".to_string()
    };
    Json(health)
}
