//! In-memory link registry.
//!
//! A read-mostly snapshot of every service's participants. Readers load the
//! current snapshot without locking; a rebuild constructs a complete new
//! snapshot and swaps it in, so no reader observes a half-built registry.
//!
//! Profile updates do not touch the registry. New or changed links become
//! visible at the next [`LinkRegistry::rebuild`].

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::models::Participant;
use crate::services::{SERVICE_COUNT, ServiceId};
use crate::store::{StoreError, UserStore};

/// Immutable participant lists, one per service.
#[derive(Debug, Default)]
pub struct RegistrySnapshot {
    participants: [Vec<Participant>; SERVICE_COUNT],
}

impl RegistrySnapshot {
    pub fn participants(&self, service: ServiceId) -> &[Participant] {
        &self.participants[service.index()]
    }

    /// Total participant count over all services.
    pub fn total(&self) -> usize {
        self.participants.iter().map(Vec::len).sum()
    }
}

/// Shared registry handle.
pub struct LinkRegistry {
    snapshot: ArcSwap<RegistrySnapshot>,
}

impl LinkRegistry {
    /// An empty registry; call [`LinkRegistry::rebuild`] to populate it.
    pub fn empty() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(RegistrySnapshot::default()),
        }
    }

    /// Build a populated registry from the store.
    pub async fn load(store: &dyn UserStore) -> Result<Self, StoreError> {
        let registry = Self::empty();
        registry.rebuild(store).await?;
        Ok(registry)
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.snapshot.load_full()
    }

    /// Re-read every service's participants and swap in the result.
    ///
    /// Fails without replacing anything if any service cannot be read.
    pub async fn rebuild(&self, store: &dyn UserStore) -> Result<(), StoreError> {
        let mut next = RegistrySnapshot::default();
        for service in ServiceId::ALL {
            next.participants[service.index()] = store.list_participants(service).await?;
        }
        let total = next.total();
        self.snapshot.store(Arc::new(next));
        info!(participants = total, "link registry rebuilt");
        Ok(())
    }

    /// Pick one participant of `service` uniformly at random.
    pub fn pick(&self, service: ServiceId) -> Option<Participant> {
        let snapshot = self.snapshot.load();
        let participants = snapshot.participants(service);
        if participants.is_empty() {
            return None;
        }
        let i = rand::rng().random_range(0..participants.len());
        Some(participants[i].clone())
    }

    /// Spawn a task that rebuilds the registry every `every` until `cancel` fires.
    /// A failed rebuild keeps the previous snapshot and is retried next tick.
    pub fn spawn_refresh_task(
        self: &Arc<Self>,
        store: Arc<dyn UserStore>,
        every: Duration,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // The first tick completes immediately; startup already built the registry.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        if let Err(e) = registry.rebuild(store.as_ref()).await {
                            warn!(error = %e, "link registry rebuild failed; keeping previous snapshot");
                        }
                    }
                }
            }
        })
    }
}

impl Default for LinkRegistry {
    fn default() -> Self {
        Self::empty()
    }
}
