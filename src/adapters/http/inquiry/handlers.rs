//! HTTP handlers for inquiry endpoints.
//!
//! These handlers connect Axum routes to the turn orchestrator. Conversation
//! failures (unknown id, backend errors) are part of the normal response
//! body, never an HTTP error status. Only malformed input is rejected
//! with `400`.

use std::convert::Infallible;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use futures::stream::{self, Stream, StreamExt};
use serde_json::json;

use crate::application::{
    ContinueInquiryCommand, StartInquiryCommand, TurnError, TurnEvent, TurnEventStream,
    TurnOrchestrator, TurnOutcome,
};

use super::dto::{ApiResponse, ContinueRequest, ErrorResponse, StartRequest, StreamEvent};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state for inquiry handlers.
#[derive(Clone)]
pub struct InquiryAppState {
    pub orchestrator: TurnOrchestrator,
}

impl InquiryAppState {
    pub fn new(orchestrator: TurnOrchestrator) -> Self {
        Self { orchestrator }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// GET /
// ════════════════════════════════════════════════════════════════════════════════

/// GET / - Liveness probe.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Hello, World!" }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Single-shot endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /inquire/start - Open a conversation and return the first reply.
///
/// # Errors
/// - 400 Bad Request: blank or oversized message
pub async fn start_inquiry(
    State(state): State<InquiryAppState>,
    Json(request): Json<StartRequest>,
) -> Result<Json<ApiResponse>, InquiryApiError> {
    let result = state
        .orchestrator
        .start(StartInquiryCommand::new(request.message))
        .await;

    Ok(Json(respond(result)?))
}

/// POST /inquire/continue - Answer the last question of a conversation.
///
/// # Errors
/// - 400 Bad Request: blank or oversized answer
pub async fn continue_inquiry(
    State(state): State<InquiryAppState>,
    Json(request): Json<ContinueRequest>,
) -> Result<Json<ApiResponse>, InquiryApiError> {
    let result = state
        .orchestrator
        .continue_inquiry(ContinueInquiryCommand::new(
            request.conversation_id,
            request.answer,
        ))
        .await;

    Ok(Json(respond(result)?))
}

fn respond(result: Result<TurnOutcome, TurnError>) -> Result<ApiResponse, InquiryApiError> {
    match result {
        Ok(outcome) => Ok(ApiResponse::from(outcome)),
        Err(TurnError::InvalidInput(err)) => Err(InquiryApiError::BadRequest(err.to_string())),
        Err(err) => Ok(ApiResponse::error(err)),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Streaming endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /inquire/start/stream - Stream the first reply as server-sent events.
pub async fn start_inquiry_stream(
    State(state): State<InquiryAppState>,
    Json(request): Json<StartRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, InquiryApiError> {
    let result = state
        .orchestrator
        .start_stream(StartInquiryCommand::new(request.message))
        .await;

    sse_response(result)
}

/// POST /inquire/continue/stream - Stream the next reply as server-sent events.
pub async fn continue_inquiry_stream(
    State(state): State<InquiryAppState>,
    Json(request): Json<ContinueRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, InquiryApiError> {
    let result = state
        .orchestrator
        .continue_stream(ContinueInquiryCommand::new(
            request.conversation_id,
            request.answer,
        ))
        .await;

    sse_response(result)
}

/// Wraps turn events as SSE. A turn that fails before streaming becomes a
/// single `error` event.
fn sse_response(
    result: Result<TurnEventStream, TurnError>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, InquiryApiError> {
    let events: TurnEventStream = match result {
        Ok(events) => events,
        Err(TurnError::InvalidInput(err)) => {
            return Err(InquiryApiError::BadRequest(err.to_string()))
        }
        Err(err) => Box::pin(stream::once(async move {
            TurnEvent::Error {
                content: err.to_string(),
            }
        })),
    };

    let body = events.map(|event| Ok(to_sse_event(&StreamEvent::from(event))));
    Ok(Sse::new(body).keep_alive(KeepAlive::default()))
}

fn to_sse_event(event: &StreamEvent) -> Event {
    Event::default().json_data(event).unwrap_or_else(|err| {
        tracing::error!(error = %err, "Failed to encode stream event");
        Event::default().data(r#"{"type":"error","content":"Failed to encode event."}"#)
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// Request rejected before any conversation work was done.
#[derive(Debug)]
pub enum InquiryApiError {
    BadRequest(String),
}

impl IntoResponse for InquiryApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            InquiryApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg))
            }
        };

        (status, Json(error)).into_response()
    }
}
