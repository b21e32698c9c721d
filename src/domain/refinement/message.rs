//! Conversation messages and the ordered history replayed to the model.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Maximum allowed length of a single user message (10,000 characters).
pub const MAX_MESSAGE_LENGTH: usize = 10_000;

/// Role of the message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions (guides model behavior).
    System,
    /// User input.
    User,
    /// Assistant (model) response.
    Assistant,
}

/// A role-tagged unit of conversation text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: MessageRole,
    content: String,
}

impl Message {
    /// Creates a new message.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Validates text supplied by the user before it enters a history.
    pub fn validate_user_text(field: &str, text: &str) -> Result<(), ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::empty_field(field));
        }
        let length = text.chars().count();
        if length > MAX_MESSAGE_LENGTH {
            return Err(ValidationError::too_long(field, MAX_MESSAGE_LENGTH, length));
        }
        Ok(())
    }
}

/// Ordered message history for one conversation.
///
/// Append-only: insertion order is the literal context sent to the model,
/// so there is no way to edit or remove an earlier message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    /// Seeds a new history with the system prompt and the opening user message.
    pub fn seeded(system_prompt: impl Into<String>, opening: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::user(opening)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the roles in order, mostly useful for asserting turn structure.
    pub fn roles(&self) -> Vec<MessageRole> {
        self.messages.iter().map(Message::role).collect()
    }
}
