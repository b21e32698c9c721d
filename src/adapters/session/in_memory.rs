//! In-memory session store.
//!
//! Default backend. Histories live in a `HashMap` behind a tokio `RwLock`
//! and vanish on restart. An optional idle TTL expires conversations nobody
//! has touched for a while; an expired entry is indistinguishable from one
//! that never existed. Expired entries are swept whenever a conversation is
//! created, so abandoned ones do not pile up.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::foundation::ConversationId;
use crate::domain::refinement::ConversationHistory;
use crate::ports::{SessionStore, SessionStoreError};

/// In-memory session store for single-process deployments.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    entries: Arc<RwLock<HashMap<ConversationId, SessionEntry>>>,
    /// Idle lifetime; `None` keeps entries until deleted.
    idle_ttl: Option<Duration>,
}

#[derive(Debug, Clone)]
struct SessionEntry {
    history: ConversationHistory,
    touched_at: DateTime<Utc>,
}

impl SessionEntry {
    fn new(history: ConversationHistory) -> Self {
        Self {
            history,
            touched_at: Utc::now(),
        }
    }
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expires entries idle for longer than `ttl`. A zero duration disables expiry.
    pub fn with_idle_ttl(mut self, ttl: Duration) -> Self {
        self.idle_ttl = (!ttl.is_zero()).then_some(ttl);
        self
    }

    /// Number of live (unexpired) conversations.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|entry| !self.is_expired(entry)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops every expired entry. Abandoned conversations are never read
    /// again, so new conversations pay for clearing them out.
    fn sweep_expired(&self, entries: &mut HashMap<ConversationId, SessionEntry>) {
        if self.idle_ttl.is_none() {
            return;
        }
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry));
        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Swept expired conversations");
        }
    }

    fn is_expired(&self, entry: &SessionEntry) -> bool {
        let Some(ttl) = self.idle_ttl else {
            return false;
        };
        // Negative age (clock went backwards) counts as fresh.
        (Utc::now() - entry.touched_at)
            .to_std()
            .map(|age| age > ttl)
            .unwrap_or(false)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(
        &self,
        id: ConversationId,
        history: ConversationHistory,
    ) -> Result<(), SessionStoreError> {
        let mut entries = self.entries.write().await;
        self.sweep_expired(&mut entries);

        if entries.contains_key(&id) {
            return Err(SessionStoreError::AlreadyExists(id));
        }
        entries.insert(id, SessionEntry::new(history));
        Ok(())
    }

    async fn get(
        &self,
        id: &ConversationId,
    ) -> Result<Option<ConversationHistory>, SessionStoreError> {
        {
            let entries = self.entries.read().await;
            match entries.get(id) {
                None => return Ok(None),
                Some(entry) if !self.is_expired(entry) => return Ok(Some(entry.history.clone())),
                Some(_) => {}
            }
        }

        // Expired: evict under the write lock, re-checking in case it was refreshed.
        let mut entries = self.entries.write().await;
        if entries.get(id).is_some_and(|entry| self.is_expired(entry)) {
            entries.remove(id);
            tracing::debug!(conversation_id = %id, "Evicted expired conversation");
        }
        Ok(None)
    }

    async fn put(
        &self,
        id: ConversationId,
        history: ConversationHistory,
    ) -> Result<(), SessionStoreError> {
        let mut entries = self.entries.write().await;

        let expired = match entries.get(&id) {
            Some(entry) => self.is_expired(entry),
            None => return Err(SessionStoreError::NotFound(id)),
        };
        if expired {
            entries.remove(&id);
            return Err(SessionStoreError::NotFound(id));
        }

        entries.insert(id, SessionEntry::new(history));
        Ok(())
    }

    async fn delete(&self, id: &ConversationId) -> Result<bool, SessionStoreError> {
        let mut entries = self.entries.write().await;
        Ok(entries
            .remove(id)
            .is_some_and(|entry| !self.is_expired(&entry)))
    }
}
