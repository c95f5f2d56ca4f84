//! Noviq - Rust Backend Library
//!
//! Business-idea analysis: an AI gateway in front of the Anthropic
//! Messages API, an append-only analysis store, and the client-side
//! workflow that walks a user from idea to analysis.
//! It includes:
//! - HTTP handlers and the axum router
//! - Business logic services
//! - Storage layer (SQLite, Config)
//! - Data models and utilities

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use commands::router;
pub use models::settings::ServerConfig;
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
