//! Integration tests for inquiry HTTP endpoints.
//!
//! These tests drive the full axum router against a scripted chat backend
//! and the in-memory session store:
//! 1. Single-shot turns return questions, then the refined query
//! 2. Unknown and finished conversations report "not found" in the body
//! 3. Streaming turns emit token events and a final_query event
//! 4. Malformed input is rejected with 400

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use query_sherpa::adapters::ai::{MockAIProvider, MockError};
use query_sherpa::adapters::http::{inquiry_router, InquiryAppState};
use query_sherpa::adapters::session::InMemorySessionStore;
use query_sherpa::application::TurnOrchestrator;
use query_sherpa::domain::foundation::ConversationId;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn app_with(provider: MockAIProvider) -> (Router, Arc<MockAIProvider>, Arc<InMemorySessionStore>) {
    let provider = Arc::new(provider);
    let store = Arc::new(InMemorySessionStore::new());
    let orchestrator = TurnOrchestrator::new(provider.clone(), store.clone());
    let router = inquiry_router(InquiryAppState::new(orchestrator));
    (router, provider, store)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(router, request).await;
    (status, serde_json::from_str(&body).unwrap())
}

/// Parses every `data:` line of an SSE body.
fn sse_events(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}

// =============================================================================
// Single-shot endpoints
// =============================================================================

#[tokio::test]
async fn root_is_liveness_probe() {
    let (router, _, _) = app_with(MockAIProvider::new());

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send_json(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Hello, World!" }));
}

#[tokio::test]
async fn start_returns_question_and_continue_returns_refined_query() {
    let (router, provider, store) = app_with(
        MockAIProvider::new()
            .with_response("Which platform should the app target?")
            .with_response("Got it.\n@FINAL_QUERY: Build an iOS habit tracker. Hope this helps!"),
    );

    let (status, first) = send_json(
        &router,
        post("/inquire/start", json!({ "message": "I want an app" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["question"], "Which platform should the app target?");
    assert!(first.get("refined_query").is_none());
    let conversation_id = first["conversation_id"].as_str().unwrap().to_string();
    assert_eq!(store.len().await, 1);

    let (status, second) = send_json(
        &router,
        post(
            "/inquire/continue",
            json!({ "conversation_id": conversation_id, "answer": "iOS" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        second,
        json!({ "refined_query": "User wants to say this: Build an iOS habit tracker." })
    );
    assert!(store.is_empty().await);

    // The second call replays the whole dialogue.
    let calls = provider.get_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].messages.len(), 4);
}

#[tokio::test]
async fn finished_conversation_is_not_found() {
    let (router, provider, _) = app_with(
        MockAIProvider::new()
            .with_response("Which platform?")
            .with_response("@FINAL_QUERY: Build it"),
    );

    let (_, first) = send_json(&router, post("/inquire/start", json!({ "message": "app" }))).await;
    let id = first["conversation_id"].as_str().unwrap().to_string();
    let continue_body = json!({ "conversation_id": id, "answer": "web" });
    send_json(&router, post("/inquire/continue", continue_body.clone())).await;

    let (status, again) = send_json(&router, post("/inquire/continue", continue_body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again, json!({ "refined_query": "Error: Conversation not found." }));
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let (router, provider, _) = app_with(MockAIProvider::new());

    for id in [ConversationId::new().to_string(), "not-a-uuid".to_string()] {
        let (status, body) = send_json(
            &router,
            post("/inquire/continue", json!({ "conversation_id": id, "answer": "yes" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["refined_query"], "Error: Conversation not found.");
    }
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn backend_failure_is_reported_in_body() {
    let (router, _, store) = app_with(MockAIProvider::new().with_error(MockError::Unavailable {
        message: "overloaded".to_string(),
    }));

    let (status, body) =
        send_json(&router, post("/inquire/start", json!({ "message": "app" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "refined_query": "Error: provider unavailable: overloaded" })
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let (router, provider, _) = app_with(MockAIProvider::new());

    let (status, body) =
        send_json(&router, post("/inquire/start", json!({ "message": "   " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn missing_field_is_rejected_by_extractor() {
    let (router, _, _) = app_with(MockAIProvider::new());

    let response = router
        .oneshot(post("/inquire/continue", json!({ "answer": "iOS" })))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// =============================================================================
// Streaming endpoints
// =============================================================================

#[tokio::test]
async fn start_stream_emits_tokens_then_done() {
    let (router, _, store) = app_with(
        MockAIProvider::new().with_chunks(["Which ", "platform", "?"]),
    );

    let (status, body) = send(
        &router,
        post("/inquire/start/stream", json!({ "message": "I want an app" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let events = sse_events(&body);
    let tokens: String = events
        .iter()
        .filter(|event| event["type"] == "token")
        .map(|event| event["content"].as_str().unwrap())
        .collect();
    assert_eq!(tokens, "Which platform?");

    let done = events.last().unwrap();
    assert_eq!(done["type"], "done");
    assert_eq!(done["question"], "Which platform?");
    assert_eq!(events[0]["conversation_id"], done["conversation_id"]);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn continue_stream_withholds_marker_and_emits_final_query() {
    let (router, _, store) = app_with(
        MockAIProvider::new()
            .with_response("Which platform?")
            .with_chunks(["Great. ", "@FINAL_", "QUERY: Build a ", "CLI tool"]),
    );

    let (_, first) = send_json(&router, post("/inquire/start", json!({ "message": "tool" }))).await;
    let id = first["conversation_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        post(
            "/inquire/continue/stream",
            json!({ "conversation_id": id, "answer": "terminal" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let events = sse_events(&body);
    let forwarded: String = events
        .iter()
        .filter(|event| event["type"] == "token")
        .map(|event| event["content"].as_str().unwrap())
        .collect();
    assert_eq!(forwarded, "Great. ");
    assert!(!body.to_uppercase().contains("@FINAL"));

    assert_eq!(
        events.last().unwrap(),
        &json!({ "type": "final_query", "refined_query": "User wants to say this: Build a CLI tool" })
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn continue_stream_unknown_id_is_single_error_event() {
    let (router, _, _) = app_with(MockAIProvider::new());

    let (status, body) = send(
        &router,
        post(
            "/inquire/continue/stream",
            json!({ "conversation_id": ConversationId::new().to_string(), "answer": "iOS" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        sse_events(&body),
        vec![json!({ "type": "error", "content": "Conversation not found." })]
    );
}

#[tokio::test]
async fn broken_stream_ends_with_error_and_keeps_session_unchanged() {
    let (router, _, store) = app_with(
        MockAIProvider::new()
            .with_response("Which platform?")
            .with_broken_stream(
                ["Partial "],
                MockError::Network {
                    message: "reset".to_string(),
                },
            ),
    );

    let (_, first) = send_json(&router, post("/inquire/start", json!({ "message": "app" }))).await;
    let id: ConversationId = first["conversation_id"].as_str().unwrap().parse().unwrap();
    let before = store_history_len(&store, &id).await;

    let (_, body) = send(
        &router,
        post(
            "/inquire/continue/stream",
            json!({ "conversation_id": id.to_string(), "answer": "web" }),
        ),
    )
    .await;

    let events = sse_events(&body);
    assert_eq!(events.last().unwrap()["type"], "error");
    assert_eq!(store_history_len(&store, &id).await, before);
}

#[tokio::test]
async fn blank_streaming_answer_is_rejected() {
    let (router, _, _) = app_with(MockAIProvider::new());

    let (status, _) = send(
        &router,
        post(
            "/inquire/continue/stream",
            json!({ "conversation_id": ConversationId::new().to_string(), "answer": "" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

async fn store_history_len(store: &InMemorySessionStore, id: &ConversationId) -> usize {
    use query_sherpa::ports::SessionStore;

    store
        .get(id)
        .await
        .unwrap()
        .map(|history| history.len())
        .unwrap_or(0)
}
