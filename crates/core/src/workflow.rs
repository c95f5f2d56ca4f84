//! Workflow State Machine
//!
//! Pure transitions for the three-stage idea workflow
//! (feedback -> questions -> submission). `reduce` never performs I/O; it
//! returns the next state plus the commands the driver must execute. Network
//! outcomes come back in as events.

use serde::{Deserialize, Serialize};

use crate::answers::AnswerSet;
use crate::idea::IdeaPrompt;
use crate::schema::{AnalysisPayload, FeedbackBatch, FollowUpQuestion, QuestionBatch};

/// Progress of one workflow run. This is what gets persisted between
/// reloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSession {
    pub prompt: IdeaPrompt,
    #[serde(default)]
    pub feedback: Vec<String>,
    #[serde(default)]
    pub feedback_index: usize,
    #[serde(default)]
    pub needs_more_info: bool,
    #[serde(default)]
    pub questions: Option<QuestionBatch>,
    #[serde(default)]
    pub answers: AnswerSet,
    /// Feedback paging finished; the question stage is on screen.
    #[serde(default)]
    pub show_questions: bool,
}

impl WorkflowSession {
    pub fn new(prompt: IdeaPrompt) -> Self {
        Self {
            prompt,
            feedback: Vec::new(),
            feedback_index: 0,
            needs_more_info: false,
            questions: None,
            answers: AnswerSet::new(),
            show_questions: false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.questions
            .as_ref()
            .is_some_and(|q| self.answers.is_complete_for(q))
    }

    /// Phase a restored session belongs in.
    fn resumed_phase(&self) -> WorkflowPhase {
        if self.feedback.is_empty() {
            WorkflowPhase::AwaitingFeedback
        } else if !self.show_questions {
            WorkflowPhase::PresentingFeedback
        } else if self.questions.is_none() {
            WorkflowPhase::AwaitingQuestions
        } else if self.answers.is_empty() {
            WorkflowPhase::PresentingQuestions
        } else {
            WorkflowPhase::CollectingAnswers
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Idle,
    AwaitingFeedback,
    PresentingFeedback,
    /// Feedback paged through, question batch not here yet
    AwaitingQuestions,
    PresentingQuestions,
    CollectingAnswers,
    Submitting,
    Complete,
    Error,
}

/// The network-bound stage a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStage {
    Feedback,
    Questions,
    Submission,
}

/// Identifies one workflow run. Every call carries the id of the run that
/// issued it, and outcomes stamped with any other id are dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(u64);

impl RunId {
    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowFailure {
    pub stage: FailedStage,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowState {
    pub phase: WorkflowPhase,
    /// Bumped by every begin, resume and abandon
    pub run: RunId,
    pub session: Option<WorkflowSession>,
    pub questions_in_flight: bool,
    /// Set in `Error`, or while a questions failure waits for feedback
    /// paging to finish.
    pub failure: Option<WorkflowFailure>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            phase: WorkflowPhase::Idle,
            run: RunId::default(),
            session: None,
            questions_in_flight: false,
            failure: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    Begin(IdeaPrompt),
    Resume(WorkflowSession),
    FeedbackReceived { run: RunId, batch: FeedbackBatch },
    FeedbackFailed { run: RunId, message: String },
    QuestionsReceived { run: RunId, batch: QuestionBatch },
    QuestionsFailed { run: RunId, message: String },
    AdvanceFeedback,
    RefreshQuestions,
    SelectAnswer { question_id: String, option: String },
    Submit,
    SubmissionSucceeded { run: RunId, analysis: AnalysisPayload },
    SubmissionFailed { run: RunId, message: String },
    Retry,
    BackToQuestions,
    Abandon,
}

impl WorkflowEvent {
    /// The run a network outcome answers; `None` for user and lifecycle events.
    pub fn run(&self) -> Option<RunId> {
        match self {
            Self::FeedbackReceived { run, .. }
            | Self::FeedbackFailed { run, .. }
            | Self::QuestionsReceived { run, .. }
            | Self::QuestionsFailed { run, .. }
            | Self::SubmissionSucceeded { run, .. }
            | Self::SubmissionFailed { run, .. } => Some(*run),
            _ => None,
        }
    }
}

/// Side effects requested by a transition, executed in order.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowCommand {
    FetchFeedback { run: RunId, prompt: IdeaPrompt },
    FetchQuestions { run: RunId, prompt: IdeaPrompt },
    Submit { run: RunId, prompt: IdeaPrompt, answers: AnswerSet },
    Persist(WorkflowSession),
    ClearPersisted,
    Deliver(AnalysisPayload),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: WorkflowState,
    pub commands: Vec<WorkflowCommand>,
}

impl Transition {
    fn unchanged(state: WorkflowState) -> Self {
        Self {
            state,
            commands: Vec::new(),
        }
    }
}

/// Apply one event. Events that make no sense in the current phase leave the
/// state untouched and emit nothing.
pub fn reduce(state: WorkflowState, event: WorkflowEvent) -> Transition {
    use WorkflowEvent as E;
    use WorkflowPhase as P;

    let mut next = state;
    let mut commands = Vec::new();

    if let Some(run) = event.run().filter(|run| *run != next.run) {
        tracing::debug!(?run, current = ?next.run, "outcome from another run dropped");
        return Transition::unchanged(next);
    }

    match event {
        E::Begin(prompt) => {
            if !matches!(next.phase, P::Idle | P::Complete) {
                tracing::debug!(phase = ?next.phase, "begin ignored, run already active");
                return Transition::unchanged(next);
            }
            let run = next.run.next();
            next = WorkflowState {
                phase: P::AwaitingFeedback,
                run,
                session: Some(WorkflowSession::new(prompt.clone())),
                ..WorkflowState::default()
            };
            commands.push(WorkflowCommand::ClearPersisted);
            commands.push(WorkflowCommand::FetchFeedback { run, prompt });
        }

        E::Resume(session) => {
            if !matches!(next.phase, P::Idle | P::Complete) {
                return Transition::unchanged(next);
            }
            let phase = session.resumed_phase();
            let prompt = session.prompt.clone();
            let run = next.run.next();
            next = WorkflowState {
                phase,
                run,
                session: Some(session),
                ..WorkflowState::default()
            };
            match phase {
                P::AwaitingFeedback => {
                    commands.push(WorkflowCommand::FetchFeedback { run, prompt });
                }
                P::PresentingFeedback | P::AwaitingQuestions if !has_questions(&next) => {
                    next.questions_in_flight = true;
                    commands.push(WorkflowCommand::FetchQuestions { run, prompt });
                }
                _ => {}
            }
        }

        E::FeedbackReceived { batch, .. } => {
            if next.phase != P::AwaitingFeedback {
                return Transition::unchanged(next);
            }
            let Some(session) = next.session.as_mut() else {
                return Transition::unchanged(next);
            };
            session.feedback = batch.feedback;
            session.feedback_index = 0;
            session.needs_more_info = batch.needs_more_info;
            let prompt = session.prompt.clone();
            let snapshot = session.clone();

            next.phase = P::PresentingFeedback;
            next.failure = None;
            next.questions_in_flight = true;
            commands.push(WorkflowCommand::Persist(snapshot));
            // Questions are always collected, whatever the feedback said.
            commands.push(WorkflowCommand::FetchQuestions {
                run: next.run,
                prompt,
            });
        }

        E::FeedbackFailed { message, .. } => {
            if next.phase != P::AwaitingFeedback {
                return Transition::unchanged(next);
            }
            next.phase = P::Error;
            next.failure = Some(WorkflowFailure {
                stage: FailedStage::Feedback,
                message,
            });
        }

        E::QuestionsReceived { batch, .. } => {
            next.questions_in_flight = false;
            let accepting = matches!(
                next.phase,
                P::PresentingFeedback | P::AwaitingQuestions | P::Error
            ) && !matches!(
                next.failure,
                Some(WorkflowFailure {
                    stage: FailedStage::Feedback | FailedStage::Submission,
                    ..
                })
            );
            let Some(session) = next.session.as_mut().filter(|s| accepting && s.questions.is_none())
            else {
                tracing::debug!("late or duplicate question batch ignored");
                return Transition::unchanged(next);
            };
            session.questions = Some(batch);
            let snapshot = session.clone();
            let phase = snapshot.resumed_phase();

            next.failure = None;
            next.phase = phase;
            commands.push(WorkflowCommand::Persist(snapshot));
        }

        E::QuestionsFailed { message, .. } => {
            next.questions_in_flight = false;
            if has_questions(&next) {
                return Transition::unchanged(next);
            }
            let failure = WorkflowFailure {
                stage: FailedStage::Questions,
                message,
            };
            match next.phase {
                // Let the user keep paging; surface it once they run out.
                P::PresentingFeedback => next.failure = Some(failure),
                P::AwaitingQuestions => {
                    next.phase = P::Error;
                    next.failure = Some(failure);
                }
                _ => {}
            }
        }

        E::AdvanceFeedback => {
            if next.phase != P::PresentingFeedback {
                return Transition::unchanged(next);
            }
            let Some(session) = next.session.as_mut() else {
                return Transition::unchanged(next);
            };
            if session.feedback_index + 1 < session.feedback.len() {
                session.feedback_index += 1;
            } else {
                session.show_questions = true;
            }
            let snapshot = session.clone();

            if snapshot.show_questions {
                next.phase = snapshot.resumed_phase();
                if next.phase == P::AwaitingQuestions && next.failure.is_some() {
                    next.phase = P::Error;
                }
            }
            commands.push(WorkflowCommand::Persist(snapshot));
        }

        E::RefreshQuestions => {
            let refreshable = matches!(next.phase, P::PresentingFeedback | P::AwaitingQuestions)
                || is_failed(&next, FailedStage::Questions);
            if !refreshable || next.questions_in_flight || has_questions(&next) {
                return Transition::unchanged(next);
            }
            if let Some(command) = refetch_questions(&mut next) {
                commands.push(command);
            }
        }

        E::SelectAnswer {
            question_id,
            option,
        } => {
            if !matches!(next.phase, P::PresentingQuestions | P::CollectingAnswers) {
                return Transition::unchanged(next);
            }
            let Some(session) = next.session.as_mut() else {
                return Transition::unchanged(next);
            };
            let Some(question) = session
                .questions
                .as_ref()
                .and_then(|q| q.get(&question_id))
                .cloned()
            else {
                tracing::warn!(question_id = %question_id, "selection for unknown question ignored");
                return Transition::unchanged(next);
            };
            if let Err(e) = session.answers.select(&question, &option) {
                tracing::warn!(error = %e, "selection ignored");
                return Transition::unchanged(next);
            }
            let snapshot = session.clone();
            next.phase = P::CollectingAnswers;
            commands.push(WorkflowCommand::Persist(snapshot));
        }

        E::Submit => {
            let ready = next.phase == P::CollectingAnswers
                && next.session.as_ref().is_some_and(WorkflowSession::is_complete);
            if !ready {
                return Transition::unchanged(next);
            }
            if let Some(command) = submit_command(&next) {
                next.phase = P::Submitting;
                commands.push(command);
            }
        }

        E::SubmissionSucceeded { analysis, .. } => {
            if next.phase != P::Submitting {
                return Transition::unchanged(next);
            }
            next = WorkflowState {
                phase: P::Complete,
                run: next.run,
                ..WorkflowState::default()
            };
            commands.push(WorkflowCommand::ClearPersisted);
            commands.push(WorkflowCommand::Deliver(analysis));
        }

        E::SubmissionFailed { message, .. } => {
            if next.phase != P::Submitting {
                return Transition::unchanged(next);
            }
            next.phase = P::Error;
            next.failure = Some(WorkflowFailure {
                stage: FailedStage::Submission,
                message,
            });
        }

        E::Retry => {
            let Some(stage) = next.failure.as_ref().map(|f| f.stage).filter(|_| next.phase == P::Error)
            else {
                return Transition::unchanged(next);
            };
            match stage {
                FailedStage::Feedback => {
                    let Some(prompt) = next.session.as_ref().map(|s| s.prompt.clone()) else {
                        return Transition::unchanged(next);
                    };
                    next.phase = P::AwaitingFeedback;
                    next.failure = None;
                    commands.push(WorkflowCommand::FetchFeedback {
                        run: next.run,
                        prompt,
                    });
                }
                FailedStage::Questions => {
                    if let Some(command) = refetch_questions(&mut next) {
                        commands.push(command);
                    }
                }
                FailedStage::Submission => {
                    if let Some(command) = submit_command(&next) {
                        next.phase = P::Submitting;
                        next.failure = None;
                        commands.push(command);
                    }
                }
            }
        }

        E::BackToQuestions => {
            if !is_failed(&next, FailedStage::Submission) {
                return Transition::unchanged(next);
            }
            next.phase = P::CollectingAnswers;
            next.failure = None;
        }

        E::Abandon => {
            // calls still in flight now answer a run that no longer exists
            next = WorkflowState {
                run: next.run.next(),
                ..WorkflowState::default()
            };
            commands.push(WorkflowCommand::ClearPersisted);
        }
    }

    Transition {
        state: next,
        commands,
    }
}

fn has_questions(state: &WorkflowState) -> bool {
    state
        .session
        .as_ref()
        .is_some_and(|s| s.questions.is_some())
}

fn is_failed(state: &WorkflowState, stage: FailedStage) -> bool {
    state.phase == WorkflowPhase::Error && state.failure.as_ref().is_some_and(|f| f.stage == stage)
}

fn refetch_questions(state: &mut WorkflowState) -> Option<WorkflowCommand> {
    let session = state.session.as_ref()?;
    let prompt = session.prompt.clone();
    state.phase = if session.show_questions {
        WorkflowPhase::AwaitingQuestions
    } else {
        WorkflowPhase::PresentingFeedback
    };
    state.failure = None;
    state.questions_in_flight = true;
    Some(WorkflowCommand::FetchQuestions {
        run: state.run,
        prompt,
    })
}

fn submit_command(state: &WorkflowState) -> Option<WorkflowCommand> {
    let session = state.session.as_ref()?;
    Some(WorkflowCommand::Submit {
        run: state.run,
        prompt: session.prompt.clone(),
        answers: session.answers.clone(),
    })
}

// ============================================================================
// Presentation
// ============================================================================

/// A recovery action offered alongside an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    Retry,
    BackToQuestions,
    GoHome,
}

/// What the UI should render for a given state.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowView<'a> {
    Idle,
    Loading,
    Feedback {
        item: &'a str,
        index: usize,
        total: usize,
        is_last: bool,
    },
    /// Distinguishable from a hang; `can_refresh` when no call is pending.
    PreparingQuestions { can_refresh: bool },
    Questions {
        questions: &'a [FollowUpQuestion],
        answers: &'a AnswerSet,
        can_submit: bool,
    },
    Submitting,
    Complete,
    Error {
        message: &'a str,
        actions: &'static [RecoveryAction],
    },
}

impl WorkflowState {
    pub fn view(&self) -> WorkflowView<'_> {
        use WorkflowPhase as P;

        match (self.phase, self.session.as_ref()) {
            (P::Idle, _) => WorkflowView::Idle,
            (P::Complete, _) => WorkflowView::Complete,
            (P::Submitting, _) => WorkflowView::Submitting,
            (P::Error, _) => {
                let (message, stage) = self
                    .failure
                    .as_ref()
                    .map(|f| (f.message.as_str(), f.stage))
                    .unwrap_or(("Something went wrong", FailedStage::Feedback));
                let actions: &'static [RecoveryAction] = match stage {
                    FailedStage::Submission => {
                        &[RecoveryAction::Retry, RecoveryAction::BackToQuestions]
                    }
                    _ => &[RecoveryAction::Retry, RecoveryAction::GoHome],
                };
                WorkflowView::Error { message, actions }
            }
            (P::PresentingFeedback, Some(s)) if !s.feedback.is_empty() => {
                let index = s.feedback_index.min(s.feedback.len() - 1);
                WorkflowView::Feedback {
                    item: &s.feedback[index],
                    index,
                    total: s.feedback.len(),
                    is_last: index + 1 == s.feedback.len(),
                }
            }
            (P::AwaitingQuestions, _) => WorkflowView::PreparingQuestions {
                can_refresh: !self.questions_in_flight,
            },
            (P::PresentingQuestions | P::CollectingAnswers, Some(s)) => match &s.questions {
                Some(batch) => WorkflowView::Questions {
                    questions: &batch.questions,
                    answers: &s.answers,
                    can_submit: s.answers.is_complete_for(batch),
                },
                None => WorkflowView::PreparingQuestions {
                    can_refresh: !self.questions_in_flight,
                },
            },
            _ => WorkflowView::Loading,
        }
    }
}
