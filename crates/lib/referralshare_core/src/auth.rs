//! Authentication flow: OAuth handshake, first-time provisioning and
//! session issuance.
//!
//! The login step issues a random `state` value that the caller must store
//! client-side before redirecting to the provider. The callback step checks
//! the echoed state against it, exchanges the code for a verified email,
//! provisions the user record, and only then creates a session with a
//! separate, freshly generated token.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::identity::{IdentityError, IdentityProvider};
use crate::session::{SessionError, SessionStore, generate_token};
use crate::store::{StoreError, UserStore};

/// Authentication flow errors.
#[derive(Debug, Error)]
pub enum AuthFlowError {
    #[error("OAuth state mismatch")]
    StateMismatch,

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A pending login: the client must keep `state` and follow `authorize_url`.
#[derive(Debug, Clone)]
pub struct LoginRedirect {
    pub state: String,
    pub authorize_url: String,
}

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub email: String,
}

/// Orchestrates sign-in, sign-out and session resolution.
#[derive(Clone)]
pub struct AuthFlow {
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserStore>,
    provider: Arc<dyn IdentityProvider>,
}

impl AuthFlow {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserStore>,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            sessions,
            users,
            provider,
        }
    }

    /// Lifetime of issued sessions.
    pub fn session_ttl(&self) -> Duration {
        self.sessions.ttl()
    }

    /// Start a login with a new random state.
    pub fn begin(&self) -> LoginRedirect {
        let state = generate_token();
        let authorize_url = self.provider.authorize_url(&state);
        LoginRedirect {
            state,
            authorize_url,
        }
    }

    /// Finish a login from the provider's callback.
    ///
    /// `echoed_state` is the `state` query parameter; `expected_state` is
    /// the value stored client-side by [`AuthFlow::begin`]. Nothing is
    /// created unless both are present and equal.
    pub async fn complete(
        &self,
        code: &str,
        echoed_state: Option<&str>,
        expected_state: Option<&str>,
    ) -> Result<IssuedSession, AuthFlowError> {
        match (echoed_state, expected_state) {
            (Some(echoed), Some(expected)) if !expected.is_empty() && echoed == expected => {}
            _ => return Err(AuthFlowError::StateMismatch),
        }

        let email = self.provider.verified_email(code).await?;
        self.users.insert_if_absent(&email).await?;
        let token = self.sessions.create(&email).await?;
        info!(email = %email, "user signed in");
        Ok(IssuedSession { token, email })
    }

    /// Resolve a session token to its identity. A missing token is `None`.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Option<String>, SessionError> {
        match token {
            Some(token) if !token.is_empty() => self.sessions.resolve(token).await,
            _ => Ok(None),
        }
    }

    /// Revoke a session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<(), SessionError> {
        self.sessions.revoke(token).await?;
        info!("user signed out");
        Ok(())
    }
}
