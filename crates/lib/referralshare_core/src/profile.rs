//! Profile editor: validate and persist a user's referral links.
//!
//! Updates are all-or-nothing. Nothing is written unless every submitted
//! link passes its service's rule, and click counts are never touched. The
//! link registry is not refreshed here.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::models::UserRecord;
use crate::store::{StoreError, UserStore};
use crate::validation::{ProfileSubmission, ValidationError};

/// Profile update errors.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct ProfileEditor {
    users: Arc<dyn UserStore>,
}

impl ProfileEditor {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Load the record for an authenticated identity.
    pub async fn load(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.users.get(email).await
    }

    /// Validate `submission` and write all links in one update.
    pub async fn update_profile(
        &self,
        email: &str,
        submission: ProfileSubmission,
    ) -> Result<(), ProfileError> {
        let links = submission.validate()?;
        self.users.update_links(email, &links).await?;
        info!(email = %email, "profile updated");
        Ok(())
    }
}
