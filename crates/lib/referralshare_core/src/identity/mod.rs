//! Identity provider seam: an OAuth2 authorization-code service that turns
//! a code into a verified email address.

mod google;

use async_trait::async_trait;
use thiserror::Error;

pub use google::{GoogleConfig, GoogleIdentityProvider};

/// Identity provider errors.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity provider misconfigured: {0}")]
    Config(String),

    #[error("Code exchange failed: {0}")]
    Exchange(String),

    #[error("User info request failed: {0}")]
    UserInfo(String),

    #[error("Email {0} is not verified by the provider")]
    Unverified(String),
}

/// An OAuth2 provider that yields verified email claims.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authorization endpoint URL carrying `state`.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code and fetch the verified email.
    async fn verified_email(&self, code: &str) -> Result<String, IdentityError>;
}
