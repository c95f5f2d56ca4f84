//! Storage Layer
//!
//! Handles data persistence: the SQLite document store and JSON config.

pub mod config;
pub mod database;

pub use config::*;
pub use database::*;
