//! Conversation session configuration

use serde::Deserialize;
use std::time::Duration;

/// Where in-progress conversations are kept.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    Memory,
    Redis,
}

/// Session store configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Store backend
    #[serde(default)]
    pub backend: SessionBackend,

    /// Idle expiry in seconds. `0` keeps conversations until they finish.
    #[serde(default)]
    pub idle_ttl_secs: u64,
}

impl SessionConfig {
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }

    pub fn uses_redis(&self) -> bool {
        self.backend == SessionBackend::Redis
    }
}
