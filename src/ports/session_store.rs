//! Session Store Port - Interface for keeping conversation histories between turns.
//!
//! A history exists in the store only while its conversation is waiting for
//! the user's next answer. It is created after the first clarifying question,
//! replaced after every later one, and deleted once the refined query has
//! been produced.

use async_trait::async_trait;

use crate::domain::foundation::ConversationId;
use crate::domain::refinement::ConversationHistory;

/// Errors that can occur during session store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("Conversation already exists: {0}")]
    AlreadyExists(ConversationId),

    #[error("Session store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to (de)serialize history: {0}")]
    Serialization(String),
}

/// Port for the conversation id to history mapping.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores the history of a brand-new conversation.
    ///
    /// # Errors
    /// Returns `SessionStoreError::AlreadyExists` if the id is taken
    async fn create(
        &self,
        id: ConversationId,
        history: ConversationHistory,
    ) -> Result<(), SessionStoreError>;

    /// Loads a history, `None` when absent (or expired).
    async fn get(&self, id: &ConversationId)
        -> Result<Option<ConversationHistory>, SessionStoreError>;

    /// Replaces the history of an existing conversation.
    ///
    /// Never recreates an entry that was deleted in the meantime.
    ///
    /// # Errors
    /// Returns `SessionStoreError::NotFound` if no entry exists
    async fn put(
        &self,
        id: ConversationId,
        history: ConversationHistory,
    ) -> Result<(), SessionStoreError>;

    /// Removes a history. Returns whether an entry was removed.
    async fn delete(&self, id: &ConversationId) -> Result<bool, SessionStoreError>;
}
