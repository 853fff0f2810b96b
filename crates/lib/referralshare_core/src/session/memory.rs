//! In-process session store, for development without Redis and for tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use super::{SessionError, SessionStore, generate_token, hash_token};

struct SessionEntry {
    email: String,
    expires_at: Instant,
}

/// Sessions held in a concurrent map. Expired entries are dropped lazily on
/// lookup and by [`MemorySessionStore::cleanup`].
pub struct MemorySessionStore {
    sessions: DashMap<String, SessionEntry>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Evict expired entries.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.sessions.retain(|_, entry| entry.expires_at > now);
    }

    /// Spawn a periodic cleanup task.
    pub fn spawn_cleanup_task(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                store.cleanup();
            }
        })
    }

    /// Number of stored (possibly expired) sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, email: &str) -> Result<String, SessionError> {
        let token = generate_token();
        self.sessions.insert(
            hash_token(&token),
            SessionEntry {
                email: email.to_string(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> Result<Option<String>, SessionError> {
        let key = hash_token(token);
        let now = Instant::now();
        match self.sessions.get(&key) {
            None => return Ok(None),
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.email.clone())),
            Some(_) => {}
        }
        // Read guard is released; drop the stale entry.
        self.sessions.remove_if(&key, |_, entry| entry.expires_at <= now);
        Ok(None)
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        self.sessions.remove(&hash_token(token));
        Ok(())
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
