//! # referralshare_core
//!
//! Core domain logic for ReferralShare: the partner-service catalogue, the
//! user-record and session stores, the in-memory link registry and the
//! OAuth-backed authentication flow.

pub mod auth;
pub mod dispatch;
pub mod identity;
pub mod migrate;
pub mod models;
pub mod profile;
pub mod registry;
pub mod services;
pub mod session;
pub mod store;
pub mod validation;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
