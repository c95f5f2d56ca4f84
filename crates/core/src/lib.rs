//! Noviq Core
//!
//! Dependency-light domain layer shared by the service and the wizard:
//!
//! - **error**: `CoreError` and `CoreResult`
//! - **idea**: the `IdeaPrompt` a workflow run is keyed on
//! - **schema**: typed, validated views of each stage's LLM reply
//! - **answers**: per-question answer selection
//! - **workflow**: the pure three-stage workflow reducer
//! - **proxy**: outbound proxy settings for the LLM client

pub mod answers;
pub mod error;
pub mod idea;
pub mod proxy;
pub mod schema;
pub mod workflow;

pub use answers::{Answer, AnswerSet};
pub use error::{CoreError, CoreResult};
pub use idea::IdeaPrompt;
pub use proxy::{ProxyConfig, ProxyProtocol};
pub use schema::{
    AnalysisPayload, ExecutiveSummary, FeedbackBatch, FollowUpQuestion, QuestionBatch,
    QuestionCategory,
};
pub use workflow::{
    reduce, FailedStage, RecoveryAction, RunId, Transition, WorkflowCommand, WorkflowEvent,
    WorkflowFailure, WorkflowPhase, WorkflowSession, WorkflowState, WorkflowView,
};
