//! Services
//!
//! Business logic services for the application.
//! Services handle the core functionality and are called by commands.

pub mod accounts;
pub mod analysis_store;
pub mod gateway;
pub mod prompts;
pub mod submission;
pub mod workflow;

pub use accounts::{AccountService, Registration};
pub use analysis_store::AnalysisStore;
pub use gateway::{AiGateway, ResponseTier};
pub use submission::SubmissionService;
pub use workflow::{FileSessionStore, HttpWorkflowApi, WorkflowController};
