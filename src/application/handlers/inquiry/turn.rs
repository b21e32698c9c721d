//! Commands, outcomes, events and errors of a single refinement turn.

use thiserror::Error;

use crate::domain::foundation::{ConversationId, ValidationError};
use crate::domain::refinement::{RefinementState, SYSTEM_PROMPT};
use crate::ports::{AIError, SessionStoreError};

/// Command opening a new refinement conversation.
#[derive(Debug, Clone)]
pub struct StartInquiryCommand {
    /// The user's initial, possibly vague, request.
    pub message: String,
}

impl StartInquiryCommand {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Command answering the last clarifying question of a conversation.
#[derive(Debug, Clone)]
pub struct ContinueInquiryCommand {
    /// Id handed out by an earlier turn, as supplied by the caller.
    pub conversation_id: String,
    pub answer: String,
}

impl ContinueInquiryCommand {
    pub fn new(conversation_id: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            answer: answer.into(),
        }
    }
}

/// Settings applied to every backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnConfig {
    pub system_prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            temperature: Some(0.8),
            max_tokens: None,
        }
    }
}

impl TurnConfig {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

/// Successful result of a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The assistant asked another question; the conversation stays open.
    Question {
        conversation_id: ConversationId,
        question: String,
    },
    /// The conversation is over. `refined_query` already carries its frame.
    RefinedQuery { refined_query: String },
}

impl TurnOutcome {
    /// State the conversation is in after this outcome.
    pub fn state(&self) -> RefinementState {
        match self {
            Self::Question { .. } => RefinementState::AwaitingAnswer,
            Self::RefinedQuery { .. } => RefinementState::Terminated,
        }
    }

    /// The closing event of a streamed turn with this outcome.
    pub fn into_event(self) -> TurnEvent {
        match self {
            Self::Question {
                conversation_id,
                question,
            } => TurnEvent::Done {
                conversation_id,
                question,
            },
            Self::RefinedQuery { refined_query } => TurnEvent::FinalQuery { refined_query },
        }
    }
}

/// Event emitted while a turn streams.
///
/// Zero or more `Token`s are followed by exactly one of `FinalQuery`,
/// `Done` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    Token {
        content: String,
        conversation_id: ConversationId,
    },
    FinalQuery {
        refined_query: String,
    },
    Done {
        conversation_id: ConversationId,
        question: String,
    },
    Error {
        content: String,
    },
}

impl TurnEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Token { .. })
    }
}

/// Failure of a turn. Committed history is untouched by every variant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TurnError {
    /// Unknown, malformed, expired or already terminated conversation id.
    #[error("Conversation not found.")]
    NotFound,

    #[error("{0}")]
    Backend(#[from] AIError),

    #[error("{0}")]
    Store(SessionStoreError),

    /// The caller's message or answer was rejected before any work was done.
    #[error("{0}")]
    InvalidInput(ValidationError),

    #[error("Invalid conversation transition: {0}")]
    InvalidTransition(ValidationError),
}

impl From<SessionStoreError> for TurnError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            // A history deleted between read and write-back is gone for good.
            SessionStoreError::NotFound(_) => TurnError::NotFound,
            other => TurnError::Store(other),
        }
    }
}
