//! Workflow Controller
//!
//! Drives the pure workflow reducer against real collaborators. The
//! controller is the only writer of the workflow state and of the session
//! store. Network calls run as spawned tasks and report back as events on
//! a channel, so feedback paging stays responsive while questions load.

use std::sync::Arc;

use tokio::sync::mpsc;

use noviq_core::{
    reduce, AnalysisPayload, IdeaPrompt, WorkflowCommand, WorkflowEvent, WorkflowState,
    WorkflowView,
};

use super::api::WorkflowApi;
use super::session_store::SessionStore;

pub struct WorkflowController {
    state: WorkflowState,
    api: Arc<dyn WorkflowApi>,
    store: Arc<dyn SessionStore>,
    events_tx: mpsc::UnboundedSender<WorkflowEvent>,
    events_rx: mpsc::UnboundedReceiver<WorkflowEvent>,
    /// Spawned calls whose outcome has not been applied yet
    pending: usize,
    delivered: Option<AnalysisPayload>,
}

impl WorkflowController {
    pub fn new(api: Arc<dyn WorkflowApi>, store: Arc<dyn SessionStore>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: WorkflowState::default(),
            api,
            store,
            events_tx,
            events_rx,
            pending: 0,
            delivered: None,
        }
    }

    /// Start a run for `prompt`, resuming the stored session if it belongs
    /// to the same prompt.
    pub fn begin(&mut self, prompt: IdeaPrompt) {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored session; starting fresh");
                None
            }
        };
        match stored {
            Some(session) if session.prompt == prompt => {
                tracing::info!(
                    feedback_index = session.feedback_index,
                    has_questions = session.questions.is_some(),
                    answers = session.answers.len(),
                    "resuming stored workflow session"
                );
                self.dispatch(WorkflowEvent::Resume(session));
            }
            Some(_) => {
                tracing::info!("stored session belongs to another idea; discarding");
                self.dispatch(WorkflowEvent::Begin(prompt));
            }
            None => self.dispatch(WorkflowEvent::Begin(prompt)),
        }
    }

    pub fn next_feedback(&mut self) {
        self.dispatch(WorkflowEvent::AdvanceFeedback);
    }

    pub fn select_answer(&mut self, question_id: impl Into<String>, option: impl Into<String>) {
        self.dispatch(WorkflowEvent::SelectAnswer {
            question_id: question_id.into(),
            option: option.into(),
        });
    }

    pub fn submit(&mut self) {
        self.dispatch(WorkflowEvent::Submit);
    }

    pub fn retry(&mut self) {
        self.dispatch(WorkflowEvent::Retry);
    }

    pub fn refresh_questions(&mut self) {
        self.dispatch(WorkflowEvent::RefreshQuestions);
    }

    pub fn back_to_questions(&mut self) {
        self.dispatch(WorkflowEvent::BackToQuestions);
    }

    /// Leave the workflow for good, dropping any stored progress.
    pub fn abandon(&mut self) {
        self.dispatch(WorkflowEvent::Abandon);
    }

    /// Wait for the next network outcome and apply it. Returns false when
    /// nothing is outstanding.
    pub async fn process_next(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        match self.events_rx.recv().await {
            Some(event) => {
                self.pending -= 1;
                self.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// Apply every outcome that has already arrived, without waiting.
    pub fn drain_ready(&mut self) {
        while self.pending > 0 {
            match self.events_rx.try_recv() {
                Ok(event) => {
                    self.pending -= 1;
                    self.dispatch(event);
                }
                Err(_) => break,
            }
        }
    }

    /// Wait until no call is outstanding.
    pub async fn settle(&mut self) {
        while self.process_next().await {}
    }

    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn view(&self) -> WorkflowView<'_> {
        self.state.view()
    }

    /// The analysis handed over on completion. The controller keeps no copy.
    pub fn take_analysis(&mut self) -> Option<AnalysisPayload> {
        self.delivered.take()
    }

    fn dispatch(&mut self, event: WorkflowEvent) {
        let transition = reduce(std::mem::take(&mut self.state), event);
        self.state = transition.state;
        for command in transition.commands {
            self.execute(command);
        }
    }

    fn execute(&mut self, command: WorkflowCommand) {
        match command {
            WorkflowCommand::FetchFeedback { run, prompt } => {
                let api = Arc::clone(&self.api);
                self.spawn(async move {
                    match api.fetch_feedback(&prompt).await {
                        Ok(batch) => WorkflowEvent::FeedbackReceived { run, batch },
                        Err(e) => WorkflowEvent::FeedbackFailed {
                            run,
                            message: e.to_string(),
                        },
                    }
                });
            }
            WorkflowCommand::FetchQuestions { run, prompt } => {
                let api = Arc::clone(&self.api);
                self.spawn(async move {
                    match api.fetch_questions(&prompt).await {
                        Ok(batch) => WorkflowEvent::QuestionsReceived { run, batch },
                        Err(e) => WorkflowEvent::QuestionsFailed {
                            run,
                            message: e.to_string(),
                        },
                    }
                });
            }
            WorkflowCommand::Submit {
                run,
                prompt,
                answers,
            } => {
                let api = Arc::clone(&self.api);
                self.spawn(async move {
                    match api.submit(&prompt, &answers).await {
                        Ok(analysis) => WorkflowEvent::SubmissionSucceeded { run, analysis },
                        Err(e) => WorkflowEvent::SubmissionFailed {
                            run,
                            message: e.to_string(),
                        },
                    }
                });
            }
            WorkflowCommand::Persist(session) => {
                if let Err(e) = self.store.save(&session) {
                    tracing::warn!(error = %e, "failed to persist workflow session");
                }
            }
            WorkflowCommand::ClearPersisted => {
                if let Err(e) = self.store.clear() {
                    tracing::warn!(error = %e, "failed to clear workflow session");
                }
            }
            WorkflowCommand::Deliver(analysis) => {
                self.delivered = Some(analysis);
            }
        }
    }

    fn spawn<F>(&mut self, call: F)
    where
        F: std::future::Future<Output = WorkflowEvent> + Send + 'static,
    {
        self.pending += 1;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            // receiver only goes away with the controller
            let _ = tx.send(call.await);
        });
    }
}
