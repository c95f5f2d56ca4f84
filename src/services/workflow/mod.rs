//! Client-side Workflow
//!
//! Feedback, questions and submission driven by the pure reducer in
//! `noviq_core::workflow`, with the session persisted between runs.

pub mod api;
pub mod controller;
pub mod session_store;

pub use api::{HttpWorkflowApi, WorkflowApi};
pub use controller::WorkflowController;
pub use session_store::{FileSessionStore, MemorySessionStore, SessionStore};
