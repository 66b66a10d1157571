//! Provider clients against a local mock HTTP server.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use research_harness::brave::BraveSearch;
use research_harness::config::{LlmConfig, SearchConfig};
use research_harness::llm::OpenAiChat;
use research_harness::traits::{TextGenerator, WebSearch};
use research_harness_core::ProviderError;

async fn start(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move { axum::serve(listener, app).await });
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn brave_sends_token_and_maps_results() {
    async fn handler(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
        let token_ok = headers
            .get("X-Subscription-Token")
            .and_then(|v| v.to_str().ok())
            == Some("test-key");
        let params_ok = params.get("q").map(String::as_str) == Some("rust news")
            && params.get("count").map(String::as_str) == Some("2")
            && params.get("result_filter").map(String::as_str) == Some("web")
            && params.get("safesearch").map(String::as_str) == Some("moderate");
        if !(token_ok && params_ok) {
            return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad request" })));
        }
        (
            StatusCode::OK,
            Json(json!({ "web": { "results": [
                { "title": "This Week in Rust", "description": "Weekly news", "url": "https://this-week-in-rust.org", "age": "1 day ago" }
            ]}})),
        )
    }

    let base = start(Router::new().route("/search", get(handler))).await;
    let config = SearchConfig {
        base_url: format!("{}/search", base),
        max_retries: 0,
        ..Default::default()
    };
    let brave = BraveSearch::new(&config, "test-key").unwrap();

    let results = brave.search("rust news", 2).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "This Week in Rust");
    assert_eq!(results[0].snippet, "Weekly news");
    assert_eq!(results[0].source, "web");
}

#[tokio::test]
async fn chat_retries_server_errors() {
    async fn handler(State(hits): State<Arc<AtomicUsize>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let n = hits.fetch_add(1, Ordering::SeqCst);
        if n < 2 {
            return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "busy" })));
        }
        let system = body["messages"][0]["content"].as_str().unwrap_or_default().to_string();
        (
            StatusCode::OK,
            Json(json!({ "choices": [{ "message": {
                "content": format!("{}|{}|{}", system.len(), body["max_tokens"], body["messages"][1]["content"].as_str().unwrap_or_default())
            }}]})),
        )
    }

    let hits = Arc::new(AtomicUsize::new(0));
    let base = start(
        Router::new()
            .route("/v1/chat/completions", post(handler))
            .with_state(hits.clone()),
    )
    .await;
    let config = LlmConfig {
        base_url: format!("{}/v1", base),
        max_retries: 3,
        ..Default::default()
    };
    let chat = OpenAiChat::new(&config, "sk-test")
        .unwrap()
        .with_backoff(Duration::from_millis(1));

    let reply = chat.generate("hello", 1500).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert!(reply.ends_with("|1500|hello"));
}

#[tokio::test]
async fn chat_fails_fast_on_client_error() {
    async fn handler(State(hits): State<Arc<AtomicUsize>>) -> (StatusCode, Json<Value>) {
        hits.fetch_add(1, Ordering::SeqCst);
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": { "message": "bad key" } })))
    }

    let hits = Arc::new(AtomicUsize::new(0));
    let base = start(
        Router::new()
            .route("/v1/chat/completions", post(handler))
            .with_state(hits.clone()),
    )
    .await;
    let config = LlmConfig {
        base_url: format!("{}/v1", base),
        max_retries: 3,
        ..Default::default()
    };
    let chat = OpenAiChat::new(&config, "sk-bad")
        .unwrap()
        .with_backoff(Duration::from_millis(1));

    let err = chat.generate("hello", 10).await.unwrap_err();
    assert!(matches!(err, ProviderError::Api(_)));
    assert!(err.to_string().contains("401"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
