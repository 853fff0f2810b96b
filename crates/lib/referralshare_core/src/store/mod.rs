//! User-record store contract.
//!
//! One record per email identity. Provisioning is idempotent, link updates
//! accept only [`ValidatedLinks`], and click counts move only through
//! [`UserStore::record_click`]. Every call is bounded by a timeout.

mod memory;
mod postgres;
#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

use crate::models::{Participant, UserRecord};
use crate::services::ServiceId;
use crate::validation::ValidatedLinks;

/// Default bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// User store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("No user record for {0}")]
    UnknownUser(String),
}

/// Persistence operations on user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Load the full record for an identity.
    async fn get(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Create a defaulted record unless one already exists.
    async fn insert_if_absent(&self, email: &str) -> Result<(), StoreError>;

    /// Replace all eight links in one atomic write. Click counts are untouched.
    async fn update_links(&self, email: &str, links: &ValidatedLinks) -> Result<(), StoreError>;

    /// Every `(email, url)` with a non-empty link for `service`.
    async fn list_participants(&self, service: ServiceId) -> Result<Vec<Participant>, StoreError>;

    /// Atomically add one to the participant's click count for `service`.
    async fn record_click(&self, email: &str, service: ServiceId) -> Result<(), StoreError>;
}

/// Run a store future under `limit`, mapping elapsed time to [`StoreError::Timeout`].
pub(crate) async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}
