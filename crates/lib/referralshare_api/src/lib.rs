//! # referralshare_api
//!
//! HTTP surface for ReferralShare: a thin mapping from routes to the core
//! services, with session-cookie authentication for the profile pages.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use referralshare_core::auth::AuthFlow;
use referralshare_core::dispatch::ReferralDispatcher;
use referralshare_core::identity::IdentityProvider;
use referralshare_core::profile::ProfileEditor;
use referralshare_core::registry::LinkRegistry;
use referralshare_core::session::SessionStore;
use referralshare_core::store::UserStore;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{auth, health, profile, referrals};

/// Route paths.
pub mod routes {
    pub const GET_HEALTH: &str = "/health";
    pub const GET_REFERRALS_SERVICE: &str = "/referrals/{service}";
    pub const GET_PROFILE: &str = "/profile";
    pub const POST_UPDATE_USER: &str = "/updateuser";
    pub const GET_AUTH_LOGIN: &str = "/auth/login";
    pub const GET_AUTH_CALLBACK: &str = "/auth/callback";
    pub const GET_AUTH_LOGOUT: &str = "/auth/logout";
    pub const INDEX: &str = "/";
}

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Sign-in, sign-out and session resolution.
    pub auth: AuthFlow,
    /// Profile reads and validated writes.
    pub profiles: ProfileEditor,
    /// Random referral redirects.
    pub dispatcher: ReferralDispatcher,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Wire the core services over shared store handles.
    pub fn new(
        config: ApiConfig,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        provider: Arc<dyn IdentityProvider>,
        registry: Arc<LinkRegistry>,
    ) -> Self {
        Self {
            auth: AuthFlow::new(sessions, Arc::clone(&users), provider),
            profiles: ProfileEditor::new(Arc::clone(&users)),
            dispatcher: ReferralDispatcher::new(registry, users),
            config,
        }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    // Public routes (no session required)
    let public = Router::new()
        .route(routes::GET_HEALTH, get(health::health_handler))
        .route(routes::GET_REFERRALS_SERVICE, get(referrals::referral_handler))
        .route(routes::GET_AUTH_LOGIN, get(auth::login_handler))
        .route(routes::GET_AUTH_CALLBACK, get(auth::callback_handler))
        .route(routes::GET_AUTH_LOGOUT, get(auth::logout_handler));

    // Protected routes (require a live session)
    let protected = Router::new()
        .route(routes::GET_PROFILE, get(profile::profile_handler))
        .route(routes::POST_UPDATE_USER, post(profile::update_user_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_session,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
