//! API server configuration.

/// Request-path settings shared by the handlers.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8000").
    pub bind_addr: String,
    /// Mark cookies `Secure`; enable whenever the site is served over HTTPS.
    pub secure_cookies: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".into(),
            secure_cookies: false,
        }
    }
}
