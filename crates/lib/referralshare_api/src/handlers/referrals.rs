//! Referral redirect handler.

use axum::extract::{Path, State};
use axum::response::Redirect;
use referralshare_core::services::ServiceId;

use crate::AppState;
use crate::error::AppResult;

/// Stored links may omit the scheme; `Location` needs an absolute URL.
fn absolute_url(url: &str) -> String {
    if url.starts_with("https://") || url.starts_with("http://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// `GET /referrals/{service}`: temporary redirect to a random participant.
pub async fn referral_handler(
    State(state): State<AppState>,
    Path(service): Path<String>,
) -> AppResult<Redirect> {
    let service: ServiceId = service.parse()?;
    // Click accounting runs detached; the redirect does not wait for it.
    let dispatched = state.dispatcher.dispatch(service)?;
    Ok(Redirect::temporary(&absolute_url(&dispatched.target)))
}
