//! Integration tests: run the gateway on a free port against a mock Gemini provider (axum, also
//! on a free port) and drive it over real HTTP, directly and through the views.
//! Server tasks are left running when each test ends.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use lib::bookmarks::BookmarkedQuestion;
use lib::client::{Gateway, GatewayClient, GatewayFailure, GatewayOutcome};
use lib::config::Config;
use lib::gateway;
use lib::llm::GeminiClient;
use lib::view::{ChatView, Role, SolverView, FAILURE_REPLY, SOLUTION_UNAVAILABLE};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const API_KEY: &str = "test-key";

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

/// What the mock provider received: request path, query, and JSON body.
#[derive(Clone, Default)]
struct Received(Arc<Mutex<Vec<(String, HashMap<String, String>, Value)>>>);

/// Mock `generateContent`: prompts containing "PROVIDER_ERROR" get a provider error,
/// "NO_CANDIDATES" an empty candidate list, "FUNCTION_CALL" a part without text,
/// anything else a fixed answer.
async fn mock_generate(
    State(received): State<Received>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    received
        .0
        .lock()
        .unwrap()
        .push((uri.path().to_string(), query, body.clone()));
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or("");
    if prompt.contains("PROVIDER_ERROR") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "code": 400, "message": "API key not valid" } })),
        );
    }
    if prompt.contains("NO_CANDIDATES") {
        return (StatusCode::OK, Json(json!({ "candidates": [] })));
    }
    if prompt.contains("FUNCTION_CALL") {
        return (
            StatusCode::OK,
            Json(json!({
                "candidates": [{ "content": { "parts": [{ "functionCall": { "name": "f" } }] } }]
            })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "It is a function." }] } }]
        })),
    )
}

async fn start_mock_provider() -> (u16, Received) {
    let received = Received::default();
    let app = Router::new()
        .fallback(mock_generate)
        .with_state(received.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock provider");
    let port = listener.local_addr().expect("local_addr").port();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (port, received)
}

/// Start the gateway pointed at `provider_base_url` and wait until `GET /` answers.
async fn start_gateway(provider_base_url: String) -> String {
    let port = free_port();
    let mut config = Config::default();
    config.gateway.port = port;
    config.gateway.bind = "127.0.0.1".to_string();
    config.provider.base_url = provider_base_url;
    // Key passed explicitly so GEMINI_API_KEY in the environment cannot override it.
    let generator = GeminiClient::from_config(&config.provider, Some(API_KEY.to_string()));

    tokio::spawn(async move {
        let _ = gateway::serve(config, Arc::new(generator)).await;
    });

    let base = format!("http://127.0.0.1:{}", port);
    let client = reqwest::Client::new();
    let mut last_err = None;
    for _ in 0..100 {
        match client.get(format!("{}/", base)).send().await {
            Ok(resp) if resp.status().is_success() => {
                let json: Value = resp.json().await.expect("parse JSON");
                assert_eq!(json.get("runtime").and_then(|v| v.as_str()), Some("running"));
                assert_eq!(json.get("port").and_then(|v| v.as_u64()), Some(port as u64));
                return base;
            }
            Ok(_) => {}
            Err(e) => last_err = Some(e),
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!(
        "GET {}/ did not return 200 with health JSON within 5s; last error: {:?}",
        base, last_err
    );
}

async fn start_stack() -> (String, Received) {
    let (provider_port, received) = start_mock_provider().await;
    let base = start_gateway(format!("http://127.0.0.1:{}/v1beta", provider_port)).await;
    (base, received)
}

#[tokio::test]
async fn proxy_forwards_prompt_with_generation_config() {
    let (base, received) = start_stack().await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/gemini", base))
        .json(&json!({ "prompt": "explain this" }))
        .send()
        .await
        .expect("post");
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.expect("json");
    assert_eq!(body, json!({ "response": "It is a function." }));

    let calls = received.0.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    let (path, query, sent) = &calls[0];
    assert_eq!(path, "/v1beta/models/gemini-pro:generateContent");
    assert_eq!(query.get("key").map(String::as_str), Some(API_KEY));
    assert_eq!(sent["contents"][0]["parts"][0]["text"], "explain this");
    assert_eq!(sent["generationConfig"]["topK"], 40);
    assert_eq!(sent["generationConfig"]["maxOutputTokens"], 2048);
}

#[tokio::test]
async fn proxy_reports_provider_error_as_500() {
    let (base, _) = start_stack().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/gemini", base))
        .json(&json!({ "prompt": "PROVIDER_ERROR please" }))
        .send()
        .await
        .expect("post");
    assert_eq!(resp.status().as_u16(), 500);
    let body: Value = resp.json().await.expect("json");
    assert_eq!(body, json!({ "error": "API key not valid" }));
}

#[tokio::test]
async fn proxy_reports_missing_candidate_generically() {
    let (base, _) = start_stack().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/gemini", base))
        .json(&json!({ "prompt": "NO_CANDIDATES" }))
        .send()
        .await
        .expect("post");
    assert_eq!(resp.status().as_u16(), 500);
    let body: Value = resp.json().await.expect("json");
    assert_eq!(body, json!({ "error": gateway::GENERIC_FAILURE }));
}

#[tokio::test]
async fn proxy_reports_part_without_text_generically() {
    let (base, _) = start_stack().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/gemini", base))
        .json(&json!({ "prompt": "FUNCTION_CALL" }))
        .send()
        .await
        .expect("post");
    assert_eq!(resp.status().as_u16(), 500);
    let body: Value = resp.json().await.expect("json");
    assert_eq!(body, json!({ "error": gateway::GENERIC_FAILURE }));

    let client = GatewayClient::new(&base);
    let mut view = ChatView::new();
    assert!(view.send(&client, "FUNCTION_CALL", None).await);
    assert_eq!(view.messages().last().unwrap().content, FAILURE_REPLY);
}

#[tokio::test]
async fn proxy_rejects_body_without_prompt() {
    let (base, received) = start_stack().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/gemini", base))
        .json(&json!({ "question": "where is the prompt?" }))
        .send()
        .await
        .expect("post");
    assert_eq!(resp.status().as_u16(), 500);
    assert!(received.0.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_provider_is_generic_failure() {
    let base = start_gateway(format!("http://127.0.0.1:{}/v1beta", free_port())).await;
    let client = GatewayClient::new(&base);
    assert_eq!(
        client.send("hello").await,
        GatewayOutcome::Failed(GatewayFailure::Service)
    );
}

#[tokio::test]
async fn chat_end_to_end_with_attached_code() {
    let (base, received) = start_stack().await;
    let client = GatewayClient::new(&base);
    let mut view = ChatView::new();

    assert!(view.send(&client, "explain this", Some("function f(){}")).await);

    let sent = received.0.lock().unwrap()[0].2.clone();
    let prompt = sent["contents"][0]["parts"][0]["text"].as_str().unwrap().to_string();
    assert!(prompt.contains("explain this"));
    assert!(prompt.contains("function f(){}"));

    let messages = view.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[2].role, Role::Assistant);
    assert_eq!(messages[2].content, "It is a function.");
    assert!(!messages[2].is_code);
    assert!(!view.is_loading());
}

#[tokio::test]
async fn chat_shows_fixed_reply_on_provider_error() {
    let (base, _) = start_stack().await;
    let client = GatewayClient::new(&base);
    let mut view = ChatView::new();

    assert!(view.send(&client, "PROVIDER_ERROR", None).await);
    let last = view.messages().last().unwrap();
    assert_eq!(last.content, FAILURE_REPLY);
    assert!(!last.content.contains("API key"));
    assert_eq!(view.last_failure(), Some(GatewayFailure::Service));
    assert!(!view.is_loading());
}

#[tokio::test]
async fn solver_end_to_end() {
    let (base, _) = start_stack().await;
    let client = GatewayClient::new(&base);
    let mut view = SolverView::new();

    let ok = BookmarkedQuestion::new("Sort", "function f(){}", "why slow").unwrap();
    assert!(view.solve(&client, &ok).await);
    assert_eq!(view.solution(), "It is a function.");

    let failing = BookmarkedQuestion::new("Broken", "x", "PROVIDER_ERROR").unwrap();
    assert!(view.solve(&client, &failing).await);
    assert_eq!(view.solution(), SOLUTION_UNAVAILABLE);
}

/// Stand-in gateway that answers every prompt with a body that is not a gateway response.
async fn start_broken_gateway() -> String {
    let app = Router::new()
        .route(
            "/bad-gateway/api/gemini",
            post(|| async {
                (
                    StatusCode::BAD_GATEWAY,
                    [(header::CONTENT_TYPE, "text/html")],
                    "<html><body>502 Bad Gateway</body></html>",
                )
                    .into_response()
            }),
        )
        .route(
            "/empty/api/gemini",
            post(|| async { (StatusCode::OK, Json(json!({}))).into_response() }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind broken gateway");
    let port = listener.local_addr().expect("local_addr").port();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn unreadable_gateway_body_is_transport_failure() {
    let base = start_broken_gateway().await;

    let html = GatewayClient::new(format!("{}/bad-gateway", base));
    assert_eq!(
        html.send("hello").await,
        GatewayOutcome::Failed(GatewayFailure::Transport)
    );

    let empty = GatewayClient::new(format!("{}/empty", base));
    assert_eq!(
        empty.send("hello").await,
        GatewayOutcome::Failed(GatewayFailure::Transport)
    );

    let mut view = ChatView::new();
    assert!(view.send(&empty, "hello", None).await);
    assert_eq!(view.messages().last().unwrap().content, FAILURE_REPLY);
    assert_eq!(view.last_failure(), Some(GatewayFailure::Transport));
}
