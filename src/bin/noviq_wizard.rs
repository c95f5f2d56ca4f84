// Noviq - terminal workflow client
//
// Walks an idea through feedback, follow-up questions and submission
// against a running noviq-server. Progress is saved after every step, so
// quitting and re-running with the same idea picks up where it left off.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use noviq::services::workflow::{FileSessionStore, HttpWorkflowApi, SessionStore, WorkflowController};
use noviq::utils::paths;
use noviq_core::{AnalysisPayload, AnswerSet, FollowUpQuestion, IdeaPrompt, RecoveryAction, WorkflowView};

#[derive(Parser, Debug)]
#[command(name = "noviq-wizard", version, about = "Turn a business idea into a Noviq analysis")]
struct Args {
    /// Base URL of noviq-server
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Attach the stored analysis to this user
    #[arg(long)]
    user_id: Option<String>,

    /// Where in-progress sessions are kept (default: ~/.noviq/workflow_session.json)
    #[arg(long)]
    session_file: Option<PathBuf>,

    /// The idea; asked for interactively when omitted
    #[arg(long)]
    prompt: Option<String>,
}

/// Owned copy of the current view, so the controller can be driven while
/// it is displayed.
enum Step {
    Idle,
    Wait,
    Feedback {
        item: String,
        index: usize,
        total: usize,
        is_last: bool,
    },
    PreparingQuestions {
        can_refresh: bool,
    },
    Questions {
        questions: Vec<FollowUpQuestion>,
        answers: AnswerSet,
        can_submit: bool,
    },
    Complete,
    Error {
        message: String,
        actions: &'static [RecoveryAction],
    },
}

impl From<WorkflowView<'_>> for Step {
    fn from(view: WorkflowView<'_>) -> Self {
        match view {
            WorkflowView::Idle => Step::Idle,
            WorkflowView::Loading | WorkflowView::Submitting => Step::Wait,
            WorkflowView::Feedback {
                item,
                index,
                total,
                is_last,
            } => Step::Feedback {
                item: item.to_string(),
                index,
                total,
                is_last,
            },
            WorkflowView::PreparingQuestions { can_refresh } => {
                Step::PreparingQuestions { can_refresh }
            }
            WorkflowView::Questions {
                questions,
                answers,
                can_submit,
            } => Step::Questions {
                questions: questions.to_vec(),
                answers: answers.clone(),
                can_submit,
            },
            WorkflowView::Complete => Step::Complete,
            WorkflowView::Error { message, actions } => Step::Error {
                message: message.to_string(),
                actions,
            },
        }
    }
}

struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// `None` on end of input.
    async fn ask(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        println!("{}", prompt);
        let line = self.lines.next_line().await.context("failed to read input")?;
        Ok(line.map(|l| l.trim().to_string()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let session_path = match args.session_file {
        Some(path) => path,
        None => paths::session_path().context("cannot locate session file")?,
    };
    let store = Arc::new(FileSessionStore::new(session_path.clone()));
    let api = Arc::new(HttpWorkflowApi::new(args.server.clone(), args.user_id)?);
    let mut console = Console::new();

    let prompt = match args.prompt {
        Some(text) => text,
        None => match store.load().ok().flatten() {
            Some(session) => {
                println!("Resuming your idea: {}", session.prompt);
                session.prompt.into_inner()
            }
            None => console
                .ask("Describe your business idea:")
                .await?
                .unwrap_or_default(),
        },
    };
    let prompt = IdeaPrompt::new(prompt).context("an idea is required")?;

    let mut controller = WorkflowController::new(api, store);
    controller.begin(prompt);
    let analysis = run(&mut controller, &mut console).await?;

    match analysis {
        Some(analysis) => print_summary(&analysis),
        None if controller.state().session.is_some() => println!(
            "Progress saved to {}. Run again with the same idea to continue.",
            session_path.display()
        ),
        None => println!("Nothing saved."),
    }
    Ok(())
}

/// Drive the workflow until it completes, is abandoned, or the user pauses.
async fn run(
    controller: &mut WorkflowController,
    console: &mut Console,
) -> anyhow::Result<Option<AnalysisPayload>> {
    loop {
        controller.drain_ready();
        let step = Step::from(controller.view());

        match step {
            Step::Idle => return Ok(None),
            Step::Complete => return Ok(controller.take_analysis()),
            Step::Wait => {
                println!("Thinking...");
                if !controller.process_next().await {
                    anyhow::bail!("workflow is waiting on a call that never started");
                }
            }
            Step::Feedback {
                item,
                index,
                total,
                is_last,
            } => {
                println!("\nFeedback {}/{}: {}", index + 1, total, item);
                let hint = if is_last {
                    "[enter] follow-up questions, [q] pause"
                } else {
                    "[enter] next, [q] pause"
                };
                match console.ask(hint).await?.as_deref() {
                    None | Some("q") => return Ok(None),
                    _ => controller.next_feedback(),
                }
            }
            Step::PreparingQuestions { can_refresh } => {
                if !can_refresh {
                    println!("Preparing your follow-up questions...");
                    controller.process_next().await;
                    continue;
                }
                match console
                    .ask("Questions are not ready. [r] try again, [q] pause")
                    .await?
                    .as_deref()
                {
                    None | Some("q") => return Ok(None),
                    Some("r") => controller.refresh_questions(),
                    _ => {}
                }
            }
            Step::Questions {
                questions,
                answers,
                can_submit,
            } => {
                if !ask_questions(controller, console, &questions, &answers, can_submit).await? {
                    return Ok(None);
                }
            }
            Step::Error { message, actions } => {
                println!("\nSomething went wrong: {}", message);
                let choices: Vec<String> = actions
                    .iter()
                    .enumerate()
                    .map(|(i, a)| format!("[{}] {}", i + 1, action_label(*a)))
                    .collect();
                let line = console
                    .ask(&format!("{}, [q] pause", choices.join(", ")))
                    .await?;
                let Some(line) = line.filter(|l| l != "q") else {
                    return Ok(None);
                };
                let picked = line
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| actions.get(i));
                match picked {
                    Some(RecoveryAction::Retry) => controller.retry(),
                    Some(RecoveryAction::BackToQuestions) => controller.back_to_questions(),
                    Some(RecoveryAction::GoHome) => controller.abandon(),
                    None => {}
                }
            }
        }
    }
}

/// One prompt on the questions screen. Returns false when the user pauses.
async fn ask_questions(
    controller: &mut WorkflowController,
    console: &mut Console,
    questions: &[FollowUpQuestion],
    answers: &AnswerSet,
    can_submit: bool,
) -> anyhow::Result<bool> {
    let pending = questions.iter().find(|q| answers.get(&q.id).is_none());

    let question = match pending {
        Some(question) => question,
        None => {
            println!("\nYour answers:");
            for (i, q) in questions.iter().enumerate() {
                let selected = answers.get(&q.id).map_or("-", |a| a.selected.as_str());
                println!("  {}. {} -> {}", i + 1, q.question_text, selected);
            }
            let line = console
                .ask("[s] submit, [number] change an answer, [x] discard, [q] pause")
                .await?;
            match line.as_deref() {
                None | Some("q") => return Ok(false),
                Some("s") if can_submit => controller.submit(),
                Some("x") => controller.abandon(),
                Some(other) => {
                    if let Some(q) = pick(other, questions) {
                        answer_one(controller, console, q).await?;
                    }
                }
            }
            return Ok(true);
        }
    };

    answer_one(controller, console, question).await
}

async fn answer_one(
    controller: &mut WorkflowController,
    console: &mut Console,
    question: &FollowUpQuestion,
) -> anyhow::Result<bool> {
    println!("\n[{}] {}", question.category.label(), question.question_text);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {}", i + 1, option);
    }
    match console.ask("Pick an option, or [q] pause").await?.as_deref() {
        None | Some("q") => Ok(false),
        Some(choice) => {
            if let Some(option) = pick(choice, &question.options) {
                controller.select_answer(question.id.clone(), option.clone());
            }
            Ok(true)
        }
    }
}

/// 1-based menu choice
fn pick<'a, T>(input: &str, items: &'a [T]) -> Option<&'a T> {
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| items.get(i))
}

fn action_label(action: RecoveryAction) -> &'static str {
    match action {
        RecoveryAction::Retry => "retry",
        RecoveryAction::BackToQuestions => "back to questions",
        RecoveryAction::GoHome => "start over",
    }
}

fn print_summary(analysis: &AnalysisPayload) {
    match analysis.executive_summary() {
        Ok(summary) => {
            println!("\nViability score: {:.0}/100", summary.viability_score);
            println!("{}", summary.headline);
            for point in &summary.key_points {
                println!("  - {}", point);
            }
        }
        Err(e) => println!("\nAnalysis stored, but its summary could not be read: {}", e),
    }
}
