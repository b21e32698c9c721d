//! Redis-backed session store for multi-process deployments.
//!
//! Each history is stored as a JSON string under
//! `query_sherpa:conversation:{id}`. Creation uses `SET NX` and replacement
//! `SET XX`, so a conversation deleted by another process is never
//! recreated by a late write. The idle TTL maps onto `EX` and is refreshed
//! on every write.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::domain::foundation::ConversationId;
use crate::domain::refinement::ConversationHistory;
use crate::ports::{SessionStore, SessionStoreError};

const KEY_PREFIX: &str = "query_sherpa:conversation";

/// Redis session store.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
    idle_ttl: Option<Duration>,
}

impl RedisSessionStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            idle_ttl: None,
        }
    }

    /// Connects to the given URL.
    pub async fn connect(url: &str) -> Result<Self, SessionStoreError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;
        Ok(Self::new(conn))
    }

    /// Expires conversations idle for longer than `ttl`. Zero disables expiry.
    pub fn with_idle_ttl(mut self, ttl: Duration) -> Self {
        self.idle_ttl = (!ttl.is_zero()).then_some(ttl);
        self
    }

    /// Writes the history with the given `SET` condition (`NX` or `XX`).
    ///
    /// Returns false when the condition was not met.
    async fn set_conditional(
        &self,
        id: &ConversationId,
        history: &ConversationHistory,
        condition: &str,
    ) -> Result<bool, SessionStoreError> {
        let payload = serde_json::to_string(history)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(session_key(id)).arg(payload).arg(condition);
        if let Some(ttl) = self.idle_ttl {
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }

        let mut conn = self.conn.clone();
        let reply: Option<String> = cmd.query_async(&mut conn).await.map_err(unavailable)?;
        Ok(reply.is_some())
    }
}

fn session_key(id: &ConversationId) -> String {
    format!("{}:{}", KEY_PREFIX, id)
}

fn unavailable(err: redis::RedisError) -> SessionStoreError {
    SessionStoreError::Unavailable(err.to_string())
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(
        &self,
        id: ConversationId,
        history: ConversationHistory,
    ) -> Result<(), SessionStoreError> {
        if self.set_conditional(&id, &history, "NX").await? {
            Ok(())
        } else {
            Err(SessionStoreError::AlreadyExists(id))
        }
    }

    async fn get(
        &self,
        id: &ConversationId,
    ) -> Result<Option<ConversationHistory>, SessionStoreError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(session_key(id)).await.map_err(unavailable)?;

        payload
            .map(|json| {
                serde_json::from_str(&json)
                    .map_err(|e| SessionStoreError::Serialization(e.to_string()))
            })
            .transpose()
    }

    async fn put(
        &self,
        id: ConversationId,
        history: ConversationHistory,
    ) -> Result<(), SessionStoreError> {
        if self.set_conditional(&id, &history, "XX").await? {
            Ok(())
        } else {
            Err(SessionStoreError::NotFound(id))
        }
    }

    async fn delete(&self, id: &ConversationId) -> Result<bool, SessionStoreError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(session_key(id)).await.map_err(unavailable)?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn session_key_is_namespaced() {
        let id = ConversationId::from_uuid(Uuid::nil());
        assert_eq!(
            session_key(&id),
            "query_sherpa:conversation:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn history_round_trips_through_stored_json() {
        let mut history = ConversationHistory::seeded("system", "Build an app");
        history.push_assistant("For which platform?");

        let json = serde_json::to_string(&history).unwrap();
        let restored: ConversationHistory = serde_json::from_str(&json).unwrap();

        assert!(json.starts_with("[{\"role\":\"system\""));
        assert_eq!(restored, history);
    }

    #[tokio::test]
    async fn connect_rejects_malformed_url() {
        let result = RedisSessionStore::connect("not-a-redis-url").await;
        assert!(matches!(result, Err(SessionStoreError::Unavailable(_))));
    }
}
