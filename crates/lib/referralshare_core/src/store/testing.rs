//! Store doubles for unit tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::{MemoryUserStore, StoreError, UserStore};
use crate::models::{Participant, UserRecord};
use crate::services::ServiceId;
use crate::validation::ValidatedLinks;

/// Memory store whose listing and click calls can be switched to fail.
#[derive(Default)]
pub(crate) struct FlakyUserStore {
    pub inner: MemoryUserStore,
    fail_listing: AtomicBool,
    fail_clicks: AtomicBool,
}

impl FlakyUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn fail_clicks(&self, fail: bool) {
        self.fail_clicks.store(fail, Ordering::SeqCst);
    }

    fn unavailable() -> StoreError {
        StoreError::Database(sqlx::Error::PoolTimedOut)
    }
}

#[async_trait]
impl UserStore for FlakyUserStore {
    async fn get(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.inner.get(email).await
    }

    async fn insert_if_absent(&self, email: &str) -> Result<(), StoreError> {
        self.inner.insert_if_absent(email).await
    }

    async fn update_links(&self, email: &str, links: &ValidatedLinks) -> Result<(), StoreError> {
        self.inner.update_links(email, links).await
    }

    async fn list_participants(&self, service: ServiceId) -> Result<Vec<Participant>, StoreError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.list_participants(service).await
    }

    async fn record_click(&self, email: &str, service: ServiceId) -> Result<(), StoreError> {
        if self.fail_clicks.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.record_click(email, service).await
    }
}
