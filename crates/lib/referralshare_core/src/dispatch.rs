//! Referral dispatch: choose a participant and count the click.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::registry::LinkRegistry;
use crate::services::ServiceId;
use crate::store::UserStore;

/// Default cap on click increments in flight at once.
pub const DEFAULT_ACCOUNTING_LIMIT: usize = 1024;

/// Dispatch errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("No participants for {0}")]
    NoParticipants(ServiceId),
}

/// Outcome of a successful dispatch.
#[derive(Debug)]
pub struct Dispatched {
    /// Redirect target.
    pub target: String,
    /// Background click accounting, or `None` when the in-flight limit was
    /// reached and the click was dropped. Dropping the handle detaches the task.
    pub accounting: Option<JoinHandle<()>>,
}

/// Serves redirect requests from the link registry.
#[derive(Clone)]
pub struct ReferralDispatcher {
    registry: Arc<LinkRegistry>,
    users: Arc<dyn UserStore>,
    accounting: Arc<Semaphore>,
}

impl ReferralDispatcher {
    pub fn new(registry: Arc<LinkRegistry>, users: Arc<dyn UserStore>) -> Self {
        Self::with_accounting_limit(registry, users, DEFAULT_ACCOUNTING_LIMIT)
    }

    /// Like [`ReferralDispatcher::new`] with at most `limit` click increments
    /// in flight.
    pub fn with_accounting_limit(
        registry: Arc<LinkRegistry>,
        users: Arc<dyn UserStore>,
        limit: usize,
    ) -> Self {
        Self {
            registry,
            users,
            accounting: Arc::new(Semaphore::new(limit)),
        }
    }

    pub fn registry(&self) -> &Arc<LinkRegistry> {
        &self.registry
    }

    /// Pick a random participant for `service` and spawn the click increment.
    ///
    /// The redirect target is returned immediately; a failed increment is
    /// logged and never affects the caller. While the store is slow enough
    /// that the in-flight limit is reached, further clicks are not counted.
    pub fn dispatch(&self, service: ServiceId) -> Result<Dispatched, DispatchError> {
        let participant = self
            .registry
            .pick(service)
            .ok_or(DispatchError::NoParticipants(service))?;

        let email = participant.email;
        let accounting = match Arc::clone(&self.accounting).try_acquire_owned() {
            Ok(permit) => {
                let users = Arc::clone(&self.users);
                Some(tokio::spawn(async move {
                    match users.record_click(&email, service).await {
                        Ok(()) => debug!(%service, email = %email, "click recorded"),
                        Err(e) => warn!(%service, email = %email, error = %e, "click accounting failed"),
                    }
                    drop(permit);
                }))
            }
            Err(_) => {
                debug!(%service, email = %email, "click accounting saturated; click dropped");
                None
            }
        };

        Ok(Dispatched {
            target: participant.url,
            accounting,
        })
    }
}
