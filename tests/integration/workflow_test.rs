//! Workflow Integration Tests
//!
//! Drives the real `WorkflowController` over `HttpWorkflowApi` against a
//! running server whose LLM provider talks to the fake upstream:
//! - the full pistachio run from idea to stored analysis
//! - a 529 on the first stage, then a manual retry
//! - resuming a paused run without repeating any LLM call

use std::sync::Arc;

use pretty_assertions::assert_eq;

use noviq::services::prompts::{ANALYSIS_INSTRUCTION, FEEDBACK_INSTRUCTION, QUESTIONS_INSTRUCTION};
use noviq::services::workflow::{
    FileSessionStore, HttpWorkflowApi, MemorySessionStore, SessionStore, WorkflowController,
};
use noviq_core::{IdeaPrompt, RecoveryAction, WorkflowPhase, WorkflowView};

use crate::support::{self, PISTACHIO};

fn controller(
    server: &support::TestServer,
    store: Arc<dyn SessionStore>,
    user_id: Option<&str>,
) -> WorkflowController {
    let api = HttpWorkflowApi::new(server.base_url.clone(), user_id.map(str::to_string)).unwrap();
    WorkflowController::new(Arc::new(api), store)
}

fn pistachio() -> IdeaPrompt {
    IdeaPrompt::new(PISTACHIO).unwrap()
}

#[tokio::test]
async fn test_pistachio_end_to_end() {
    let server = support::start().await;
    let store = Arc::new(MemorySessionStore::new());
    let mut ctl = controller(&server, store.clone(), Some("student-1"));

    ctl.begin(pistachio());
    ctl.settle().await;

    // four feedback items, shown one at a time
    for index in 0..4 {
        match ctl.view() {
            WorkflowView::Feedback { index: i, total, .. } => {
                assert_eq!((i, total), (index, 4));
            }
            other => panic!("expected feedback, got {:?}", other),
        }
        ctl.next_feedback();
    }

    let ids: Vec<String> = match ctl.view() {
        WorkflowView::Questions {
            questions,
            can_submit,
            ..
        } => {
            assert_eq!(questions.len(), 4);
            assert!(questions.iter().all(|q| q.options.len() == 4));
            assert!(!can_submit);
            questions.iter().map(|q| q.id.clone()).collect()
        }
        other => panic!("expected questions, got {:?}", other),
    };
    for id in &ids {
        ctl.select_answer(id.clone(), "Option B");
    }
    assert!(matches!(ctl.view(), WorkflowView::Questions { can_submit: true, .. }));

    ctl.submit();
    ctl.settle().await;
    assert_eq!(ctl.view(), WorkflowView::Complete);

    let analysis = ctl.take_analysis().expect("analysis delivered");
    let summary = analysis.executive_summary().unwrap();
    assert!((0.0..=100.0).contains(&summary.viability_score));
    assert!(!summary.headline.is_empty());
    assert!(store.snapshot().is_none());

    let record = server
        .state
        .analyses()
        .get_latest("student-1")
        .unwrap()
        .expect("record stored");
    assert_eq!(record.business_idea, PISTACHIO);
    assert_eq!(record.answers.len(), 4);
    assert_eq!(record.analysis, support::analysis_reply());

    assert_eq!(
        server.upstream.systems(),
        vec![
            FEEDBACK_INSTRUCTION.to_string(),
            QUESTIONS_INSTRUCTION.to_string(),
            ANALYSIS_INSTRUCTION.to_string(),
        ]
    );
    let requests = server.upstream.requests();
    assert_eq!(
        requests[0]["messages"][0]["content"],
        format!("User's idea: {}", PISTACHIO)
    );
    assert_eq!(requests[2]["model"], "claude-3-sonnet-20240229");
    assert_eq!(requests[2]["max_tokens"], 4000);
}

#[tokio::test]
async fn test_overloaded_feedback_leaves_nothing_to_resume() {
    let server = support::start().await;
    server.upstream.overload_next(1);
    let store = Arc::new(MemorySessionStore::new());
    let mut ctl = controller(&server, store.clone(), None);

    ctl.begin(pistachio());
    ctl.settle().await;

    assert_eq!(ctl.state().phase, WorkflowPhase::Error);
    match ctl.view() {
        WorkflowView::Error { message, actions } => {
            assert!(message.contains("Overloaded"), "message: {}", message);
            assert_eq!(actions, &[RecoveryAction::Retry, RecoveryAction::GoHome]);
        }
        other => panic!("expected error, got {:?}", other),
    }
    assert_eq!(store.save_count(), 0);
    assert!(store.load().unwrap().is_none());

    ctl.retry();
    ctl.settle().await;
    assert_eq!(ctl.state().phase, WorkflowPhase::PresentingFeedback);

    let requests = server.upstream.requests();
    assert_eq!(requests.len(), 3);
    // the retry is the same call again
    assert_eq!(requests[0], requests[1]);
    assert_eq!(requests[2]["system"], QUESTIONS_INSTRUCTION);
    assert!(store.snapshot().unwrap().questions.is_some());
}

#[tokio::test]
async fn test_paused_run_resumes_without_llm_calls() {
    let server = support::start().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workflow_session.json");

    {
        let mut ctl = controller(&server, Arc::new(FileSessionStore::new(&path)), None);
        ctl.begin(pistachio());
        ctl.settle().await;
        ctl.next_feedback();
        ctl.next_feedback();
    }
    let calls_before = server.upstream.requests().len();
    assert_eq!(calls_before, 2);
    assert!(path.exists());

    let mut ctl = controller(&server, Arc::new(FileSessionStore::new(&path)), None);
    ctl.begin(pistachio());
    assert!(!ctl.is_busy());
    ctl.settle().await;

    assert_eq!(server.upstream.requests().len(), calls_before);
    match ctl.view() {
        WorkflowView::Feedback { index, total, .. } => assert_eq!((index, total), (2, 4)),
        other => panic!("expected feedback, got {:?}", other),
    }

    // a different idea starts over and drops the stored run
    let mut other = controller(&server, Arc::new(FileSessionStore::new(&path)), None);
    other.begin(IdeaPrompt::new("A mobile bike repair van").unwrap());
    other.settle().await;
    let stored = FileSessionStore::new(&path).load().unwrap().unwrap();
    assert_eq!(stored.prompt.as_str(), "A mobile bike repair van");
}
