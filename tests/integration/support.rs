//! Shared helpers: a fake Anthropic Messages endpoint and a running
//! noviq server wired to it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use noviq::services::prompts::{ANALYSIS_INSTRUCTION, FEEDBACK_INSTRUCTION, QUESTIONS_INSTRUCTION};
use noviq::{router, AppState, ServerConfig};

pub const PISTACHIO: &str = "Open a pistachio-themed coffee shop near the university";

/// Scripted stand-in for the Anthropic Messages API. Routes on the system
/// prompt, and can be told to answer the next requests with 529.
#[derive(Default)]
pub struct FakeAnthropic {
    overloaded: AtomicUsize,
    requests: Mutex<Vec<Value>>,
}

impl FakeAnthropic {
    /// Fail the next `n` requests with 529 Overloaded.
    pub fn overload_next(&self, n: usize) {
        self.overloaded.store(n, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    /// System prompts of every request received, in order.
    pub fn systems(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r["system"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    fn handle(&self, body: Value) -> Response {
        self.requests.lock().unwrap().push(body.clone());

        let overloaded = self
            .overloaded
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if overloaded {
            return (
                StatusCode::from_u16(529).unwrap(),
                Json(json!({
                    "type": "error",
                    "error": { "type": "overloaded_error", "message": "Overloaded" }
                })),
            )
                .into_response();
        }

        let system = body["system"].as_str().unwrap_or_default();
        let text = if system == FEEDBACK_INSTRUCTION {
            format!("```json\n{}\n```", feedback_reply())
        } else if system == QUESTIONS_INSTRUCTION {
            questions_reply().to_string()
        } else if system == ANALYSIS_INSTRUCTION {
            analysis_reply().to_string()
        } else {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "type": "error",
                    "error": { "type": "invalid_request_error", "message": "unknown system prompt" }
                })),
            )
                .into_response();
        };

        Json(json!({
            "content": [{ "type": "text", "text": text }],
            "model": body["model"],
            "stop_reason": "end_turn",
            "usage": { "input_tokens": 100, "output_tokens": 200 }
        }))
        .into_response()
    }
}

async fn messages(State(fake): State<Arc<FakeAnthropic>>, Json(body): Json<Value>) -> Response {
    fake.handle(body)
}

pub fn feedback_reply() -> Value {
    json!({
        "feedback": [
            "Pistachio drinks are trending and photograph well.",
            "A campus location gives steady weekday traffic.",
            "Students are price sensitive, so watch margins.",
            "Seasonal menus could keep regulars coming back."
        ],
        "needsMoreInfo": false
    })
}

pub fn questions_reply() -> Value {
    let categories = ["target_market", "revenue_model", "unique_value", "resources_needed"];
    let questions: Vec<Value> = categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            json!({
                "id": format!("q{}", i + 1),
                "question": format!("Question {} about {}?", i + 1, category),
                "category": category,
                "options": ["Option A", "Option B", "Option C", "Option D"]
            })
        })
        .collect();
    json!({ "questions": questions })
}

pub fn analysis_reply() -> Value {
    json!({
        "offline_analysis": {
            "executive_summary": {
                "viability_score": 78,
                "headline": "A focused niche cafe with a clear student audience",
                "key_points": ["Strong differentiation", "Thin margins"]
            },
            "swot": {
                "strengths": ["Unique menu"],
                "weaknesses": ["Single product focus"],
                "opportunities": ["Catering for campus events"],
                "threats": ["Chain coffee competitors"]
            },
            "radar_chart": {
                "market_demand": 7,
                "competition": 5,
                "profitability": 6,
                "scalability": 4,
                "founder_fit": 8
            }
        }
    })
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub upstream: Arc<FakeAnthropic>,
}

/// Start a fake upstream and a noviq server over an in-memory database.
pub async fn start() -> TestServer {
    let upstream = Arc::new(FakeAnthropic::default());
    let upstream_url = serve(
        Router::new()
            .route("/v1/messages", post(messages))
            .with_state(upstream.clone()),
    )
    .await;

    let config = ServerConfig {
        api_key: Some("test-key".into()),
        database_url: Some(":memory:".into()),
        llm_base_url: Some(format!("{}/v1/messages", upstream_url)),
        request_timeout_secs: 10,
        ..Default::default()
    };
    config.validate().unwrap();
    let state = AppState::from_config(&config).unwrap();
    let base_url = serve(router(state.clone())).await;

    TestServer {
        base_url,
        state,
        upstream,
    }
}
