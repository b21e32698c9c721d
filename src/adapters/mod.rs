//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Chat backends (OpenAI, scripted mock)
//! - `session` - Conversation stores (in-memory, Redis)
//! - `http` - Axum endpoints

pub mod ai;
pub mod http;
pub mod session;

pub use ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
pub use session::{InMemorySessionStore, RedisSessionStore};
