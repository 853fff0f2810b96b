//! Authentication request handlers.

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum_extra::extract::CookieJar;
use referralshare_core::auth::IssuedSession;
use serde::Deserialize;
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::routes;
use crate::services::cookies::{
    SESSION_COOKIE, STATE_COOKIE, clear_session_cookie, clear_state_cookie, session_cookie,
    state_cookie,
};

/// `GET /auth/login`: set the state cookie and redirect to the provider.
///
/// The cookie travels on the redirect response itself, so it is in place
/// before the provider can call back.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let login = state.auth.begin();
    let jar = jar.add(state_cookie(&login.state, state.config.secure_cookies));
    (jar, Redirect::temporary(&login.authorize_url))
}

/// Query parameters the provider sends to the callback.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// `GET /auth/callback`: finish sign-in and issue the session cookie, then go to
/// the profile.
///
/// The state cookie is single-use and is cleared whether or not sign-in
/// succeeds.
pub async fn callback_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, AppResult<Redirect>) {
    let secure = state.config.secure_cookies;
    let expected = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.add(clear_state_cookie(secure));

    match complete_sign_in(&state, params, expected.as_deref()).await {
        Ok(session) => (
            jar.add(session_cookie(&session.token, state.auth.session_ttl(), secure)),
            Ok(Redirect::temporary(routes::GET_PROFILE)),
        ),
        Err(e) => (jar, Err(e)),
    }
}

async fn complete_sign_in(
    state: &AppState,
    params: CallbackParams,
    expected: Option<&str>,
) -> AppResult<IssuedSession> {
    if let Some(error) = params.error {
        debug!(error = %error, "provider declined authorization");
        return Err(AppError::BadRequest(format!("authorization declined: {error}")));
    }
    let code = params
        .code
        .ok_or_else(|| AppError::BadRequest("missing authorization code".into()))?;
    Ok(state
        .auth
        .complete(&code, params.state.as_deref(), expected)
        .await?)
}

/// `GET /auth/logout`: revoke the session and clear its cookie.
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Redirect)> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.auth.logout(cookie.value()).await?;
    }
    let jar = jar.add(clear_session_cookie(state.config.secure_cookies));
    Ok((jar, Redirect::temporary(routes::INDEX)))
}
