//! Session middleware: resolve the session cookie to an identity.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::AppState;
use crate::error::AppError;
use crate::services::cookies::SESSION_COOKIE;

/// Identity of the signed-in user, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

/// Axum middleware: resolves the session cookie through the session store
/// and injects `AuthenticatedUser`. Anonymous requests are redirected to
/// login; a session store failure is an error, not an anonymous request.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar.get(SESSION_COOKIE).map(|c| c.value());
    let email = state
        .auth
        .authenticate(token)
        .await?
        .ok_or(AppError::NotAuthenticated)?;

    request.extensions_mut().insert(AuthenticatedUser(email));

    Ok(next.run(request).await)
}
