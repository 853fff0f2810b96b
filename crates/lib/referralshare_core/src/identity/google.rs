//! Google OAuth2 identity provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{IdentityError, IdentityProvider};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Only the email claim is requested.
const EMAIL_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.email";

/// Client registration and endpoints.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl GoogleConfig {
    /// Configuration against Google's public endpoints.
    pub fn new(client_id: String, client_secret: String, redirect_url: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_url,
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Response from the userinfo v2 endpoint.
#[derive(Debug, Deserialize)]
struct GoogleUser {
    email: String,
    #[serde(default)]
    verified_email: bool,
}

pub struct GoogleIdentityProvider {
    config: GoogleConfig,
    auth_url: Url,
    client: reqwest::Client,
}

impl GoogleIdentityProvider {
    /// Build a provider whose HTTP calls give up after `timeout`.
    pub fn new(config: GoogleConfig, timeout: Duration) -> Result<Self, IdentityError> {
        let auth_url = Url::parse(&config.auth_url)
            .map_err(|e| IdentityError::Config(format!("auth url {}: {e}", config.auth_url)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::Config(format!("http client: {e}")))?;
        Ok(Self {
            config,
            auth_url,
            client,
        })
    }

    async fn exchange_code(&self, code: &str) -> Result<String, IdentityError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_url.as_str()),
        ];

        let resp = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| IdentityError::Exchange(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(IdentityError::Exchange(format!("HTTP {status}: {body}")));
        }

        let token = resp
            .json::<TokenResponse>()
            .await
            .map_err(|e| IdentityError::Exchange(format!("token response parse error: {e}")))?;
        Ok(token.access_token)
    }

    async fn fetch_user(&self, access_token: &str) -> Result<GoogleUser, IdentityError> {
        let resp = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IdentityError::UserInfo(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(IdentityError::UserInfo(format!("HTTP {}", resp.status())));
        }

        resp.json::<GoogleUser>()
            .await
            .map_err(|e| IdentityError::UserInfo(format!("userinfo parse error: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorize_url(&self, state: &str) -> String {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("response_type", "code"),
            ("scope", EMAIL_SCOPE),
            ("state", state),
        ];
        let mut url = self.auth_url.clone();
        url.query_pairs_mut().extend_pairs(params);
        url.into()
    }

    async fn verified_email(&self, code: &str) -> Result<String, IdentityError> {
        let access_token = self.exchange_code(code).await?;
        let user = self.fetch_user(&access_token).await?;
        if !user.verified_email {
            return Err(IdentityError::Unverified(user.email));
        }
        debug!(email = %user.email, "identity verified");
        Ok(user.email)
    }
}
