//! Cookie service: set and clear the OAuth state and session cookies.

use std::time::Duration as StdDuration;

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Cookie holding the OAuth `state` between login and callback.
pub const STATE_COOKIE: &str = "oauthstate";
/// Cookie holding the session token.
pub const SESSION_COOKIE: &str = "referralshare_session";

/// How long a login may take before the state cookie lapses.
pub const STATE_COOKIE_MAX_AGE: Duration = Duration::minutes(10);

fn base(name: &'static str, value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

/// Build the short-lived OAuth state cookie.
pub fn state_cookie(state: &str, secure: bool) -> Cookie<'static> {
    base(STATE_COOKIE, state.to_string(), STATE_COOKIE_MAX_AGE, secure)
}

/// Build the session cookie; its lifetime matches the session TTL.
pub fn session_cookie(token: &str, ttl: StdDuration, secure: bool) -> Cookie<'static> {
    let max_age = Duration::try_from(ttl).unwrap_or(Duration::MAX);
    base(SESSION_COOKIE, token.to_string(), max_age, secure)
}

/// Build an expired cookie to clear the OAuth state.
pub fn clear_state_cookie(secure: bool) -> Cookie<'static> {
    base(STATE_COOKIE, String::new(), Duration::ZERO, secure)
}

/// Build an expired cookie to clear the session.
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    base(SESSION_COOKIE, String::new(), Duration::ZERO, secure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_matches_ttl() {
        let cookie = session_cookie("tok", StdDuration::from_secs(3600), true);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.max_age(), Some(Duration::hours(1)));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn clearing_cookies_expire_immediately() {
        for cookie in [clear_state_cookie(false), clear_session_cookie(false)] {
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }
    }
}
