//! Endpoint Integration Tests
//!
//! Plain HTTP against a running server: dashboard reads, registration,
//! the completion proxy failure body and the health check.

use serde_json::{json, Value};

use crate::support;

async fn get(url: String) -> (u16, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

async fn post(url: String, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_all_analyses_without_user_is_empty_success() {
    let server = support::start().await;
    let (status, body) = get(format!("{}/api/analyses/all", server.base_url)).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "success": true, "analyses": [] }));
}

#[tokio::test]
async fn test_submit_then_read_back() {
    let server = support::start().await;
    let (status, body) = post(
        format!("{}/api/answers", server.base_url),
        json!({
            "prompt": support::PISTACHIO,
            "answers": { "q1": { "question": "Who buys?", "selected": "Students" } },
            "userId": "u-42"
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);

    let (_, latest) = get(format!("{}/api/analyses?userId=u-42", server.base_url)).await;
    assert_eq!(latest["success"], true);
    assert_eq!(latest["analysis"]["businessIdea"], support::PISTACHIO);
    assert_eq!(latest["analysis"]["userId"], "u-42");

    let (_, all) = get(format!("{}/api/analyses/all?userId=u-42", server.base_url)).await;
    assert_eq!(all["analyses"].as_array().unwrap().len(), 1);
    assert_eq!(all["analyses"][0]["_debug"]["hasSummary"], true);

    let (_, none) = get(format!("{}/api/analyses?userId=someone-else", server.base_url)).await;
    assert_eq!(none, json!({ "success": false, "message": "No analysis found" }));
}

#[tokio::test]
async fn test_proxy_reports_upstream_failure_as_500() {
    let server = support::start().await;
    server.upstream.overload_next(1);
    let (status, body) = post(
        format!("{}/api/ai", server.base_url),
        json!({ "prompt": support::PISTACHIO, "systemPrompt": noviq::services::prompts::FEEDBACK_INSTRUCTION }),
    )
    .await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to process AI request");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let server = support::start().await;
    let url = format!("{}/api/register", server.base_url);
    let body = json!({ "name": "Sam", "email": "sam@example.com", "password": "pistachio" });

    let (status, created) = post(url.clone(), body.clone()).await;
    assert_eq!(status, 201);
    assert_eq!(created["message"], "User created successfully");

    let (status, duplicate) = post(url, body).await;
    assert_eq!(status, 400);
    assert_eq!(duplicate["message"], "User already exists");
}

#[tokio::test]
async fn test_health() {
    let server = support::start().await;
    let (status, body) = get(format!("{}/api/health", server.base_url)).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "noviq");
    assert_eq!(body["database"], true);
    assert_eq!(body["gateway"], true);
}
