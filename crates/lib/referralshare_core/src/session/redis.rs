//! Redis-backed session store over a `bb8` connection pool.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection};
use bb8_redis::redis::AsyncCommands;

use super::{SessionError, SessionStore, bounded, generate_token, hash_token};

const KEY_PREFIX: &str = "session:";

fn session_key(token: &str) -> String {
    format!("{KEY_PREFIX}{}", hash_token(token))
}

/// Session store issuing `SET … EX`, `GET` and `DEL` against Redis.
#[derive(Clone)]
pub struct RedisSessionStore {
    pool: Pool<RedisConnectionManager>,
    ttl: Duration,
    timeout: Duration,
}

impl RedisSessionStore {
    /// Build a pool for `url`. Connections are opened lazily by `bb8`.
    pub async fn connect(
        url: &str,
        max_size: u32,
        ttl: Duration,
        timeout: Duration,
    ) -> Result<Self, SessionError> {
        let manager = RedisConnectionManager::new(url)
            .map_err(|e| SessionError::Unavailable(format!("invalid redis url: {e}")))?;
        let pool = Pool::builder()
            .max_size(max_size)
            .connection_timeout(timeout)
            .build(manager)
            .await
            .map_err(|e| SessionError::Unavailable(e.to_string()))?;
        Ok(Self { pool, ttl, timeout })
    }

    async fn conn(&self) -> Result<PooledConnection<'_, RedisConnectionManager>, SessionError> {
        self.pool
            .get()
            .await
            .map_err(|e| SessionError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, email: &str) -> Result<String, SessionError> {
        let token = generate_token();
        let key = session_key(&token);
        bounded(self.timeout, async {
            let mut conn = self.conn().await?;
            conn.set_ex::<_, _, ()>(&key, email, self.ttl.as_secs())
                .await
                .map_err(|e| SessionError::Unavailable(e.to_string()))
        })
        .await?;
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> Result<Option<String>, SessionError> {
        let key = session_key(token);
        bounded(self.timeout, async {
            let mut conn = self.conn().await?;
            conn.get::<_, Option<String>>(&key)
                .await
                .map_err(|e| SessionError::Unavailable(e.to_string()))
        })
        .await
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        let key = session_key(token);
        bounded(self.timeout, async {
            let mut conn = self.conn().await?;
            conn.del::<_, ()>(&key)
                .await
                .map_err(|e| SessionError::Unavailable(e.to_string()))
        })
        .await
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_prefixed_hash_not_raw_token() {
        let key = session_key("raw-token");
        assert!(key.starts_with(KEY_PREFIX));
        assert!(!key.contains("raw-token"));
        assert_eq!(key.len(), KEY_PREFIX.len() + 64);
    }
}
