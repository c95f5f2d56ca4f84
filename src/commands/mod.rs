//! HTTP Handlers
//!
//! The JSON endpoints exposed by `noviq-server`, and the router that wires
//! them to the shared [`AppState`].

pub mod ai;
pub mod analyses;
pub mod answers;
pub mod health;
pub mod register;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/ai", post(ai::complete))
        .route("/api/answers", post(answers::submit_answers))
        .route("/api/analyses", get(analyses::latest_analysis))
        .route("/api/analyses/all", get(analyses::all_analyses))
        .route("/api/register", post(register::register))
        .route("/api/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
