//! Session store adapters.
//!
//! - `InMemorySessionStore` - process-local default, optional idle TTL
//! - `RedisSessionStore` - shared store for multi-process deployments

mod in_memory;
mod redis;

pub use self::in_memory::InMemorySessionStore;
pub use self::redis::RedisSessionStore;
