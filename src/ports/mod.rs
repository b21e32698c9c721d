//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - chat-completion backend (blocking and streaming)
//! - `SessionStore` - conversation id to history mapping between turns

mod ai_provider;
mod session_store;

pub use ai_provider::{
    AIError, AIProvider, ChunkStream, CompletionRequest, CompletionResponse, FinishReason,
    ProviderInfo, StreamChunk, TokenUsage,
};
pub use session_store::{SessionStore, SessionStoreError};
