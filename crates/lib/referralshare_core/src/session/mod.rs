//! Session store: opaque random tokens bound to a verified email.
//!
//! Unknown and expired tokens resolve to `None`. Backend failures are
//! returned as [`SessionError`] and never read as "not signed in".

mod memory;
mod redis;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

pub use memory::MemorySessionStore;
pub use redis::RedisSessionStore;

/// Default session lifetime: 30 days.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Session store errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session store unavailable: {0}")]
    Unavailable(String),

    #[error("Session store call timed out after {0:?}")]
    Timeout(Duration),
}

/// Binds session tokens to identities with a fixed time-to-live.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Generate a new token bound to `email` and return it.
    async fn create(&self, email: &str) -> Result<String, SessionError>;

    /// Return the identity bound to `token`, if the binding is still live.
    async fn resolve(&self, token: &str) -> Result<Option<String>, SessionError>;

    /// Delete the binding. Revoking an unknown token succeeds.
    async fn revoke(&self, token: &str) -> Result<(), SessionError>;

    /// Lifetime applied to new sessions; cookies should use the same value.
    fn ttl(&self) -> Duration;
}

/// Generate a 256-bit random token, URL-safe base64 without padding.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 a token so the raw value is never used as a storage key.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, SessionError>
where
    F: Future<Output = Result<T, SessionError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| SessionError::Timeout(limit))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_url_safe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn hash_is_hex_sha256() {
        let h = hash_token("abc");
        assert_eq!(
            h,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
