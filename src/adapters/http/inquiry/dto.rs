//! HTTP DTOs for inquiry endpoints.
//!
//! These types decouple the HTTP API from application types, allowing independent evolution.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::application::{TurnEvent, TurnOutcome};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /inquire/start` and its streaming twin.
#[derive(Debug, Clone, Deserialize)]
pub struct StartRequest {
    pub message: String,
}

/// Body of `POST /inquire/continue` and its streaming twin.
#[derive(Debug, Clone, Deserialize)]
pub struct ContinueRequest {
    pub conversation_id: String,
    pub answer: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Single-shot response.
///
/// Exactly one of `question` and `refined_query` is present. Failures travel
/// in `refined_query` as `"Error: ..."` so callers only need one shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refined_query: Option<String>,
}

impl ApiResponse {
    pub fn error(message: impl fmt::Display) -> Self {
        Self {
            refined_query: Some(format!("Error: {}", message)),
            ..Self::default()
        }
    }
}

impl From<TurnOutcome> for ApiResponse {
    fn from(outcome: TurnOutcome) -> Self {
        match outcome {
            TurnOutcome::Question {
                conversation_id,
                question,
            } => Self {
                conversation_id: Some(conversation_id.to_string()),
                question: Some(question),
                refined_query: None,
            },
            TurnOutcome::RefinedQuery { refined_query } => Self {
                refined_query: Some(refined_query),
                ..Self::default()
            },
        }
    }
}

/// One `data:` payload of a streaming response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Token {
        content: String,
        conversation_id: String,
    },
    FinalQuery {
        refined_query: String,
    },
    Done {
        conversation_id: String,
        question: String,
    },
    Error {
        content: String,
    },
}

impl From<TurnEvent> for StreamEvent {
    fn from(event: TurnEvent) -> Self {
        match event {
            TurnEvent::Token {
                content,
                conversation_id,
            } => Self::Token {
                content,
                conversation_id: conversation_id.to_string(),
            },
            TurnEvent::FinalQuery { refined_query } => Self::FinalQuery { refined_query },
            TurnEvent::Done {
                conversation_id,
                question,
            } => Self::Done {
                conversation_id: conversation_id.to_string(),
                question,
            },
            TurnEvent::Error { content } => Self::Error { content },
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response for rejected requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }
}
