//! Application error types.

use axum::{
    Json,
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use referralshare_core::auth::AuthFlowError;
use referralshare_core::dispatch::DispatchError;
use referralshare_core::profile::ProfileError;
use referralshare_core::services::UnknownService;
use referralshare_core::session::SessionError;
use referralshare_core::store::StoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::routes;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    /// No live session; answered with a 303 to the login route so that a
    /// rejected POST is followed up with a GET.
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Identity provider failure: {0}")]
    UpstreamAuth(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::NotAuthenticated => {
                return Redirect::to(routes::GET_AUTH_LOGIN).into_response();
            }
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, "bad_request", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::UpstreamAuth(cause) => {
                error!(error = %cause, "identity provider failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_auth_failure",
                    "Sign-in with the identity provider failed",
                )
            }
            AppError::StoreUnavailable(cause) => {
                error!(error = %cause, "store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store_unavailable",
                    "Service temporarily unavailable",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        if let StoreError::UnknownUser(email) = &e {
            return AppError::NotFound(format!("no profile for {email}"));
        }
        AppError::StoreUnavailable(e.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::StoreUnavailable(e.to_string())
    }
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::Validation(v) => AppError::Validation(v.to_string()),
            ProfileError::Store(s) => AppError::from(s),
        }
    }
}

impl From<AuthFlowError> for AppError {
    fn from(e: AuthFlowError) -> Self {
        match e {
            AuthFlowError::StateMismatch => {
                AppError::BadRequest("OAuth state mismatch; please sign in again".into())
            }
            AuthFlowError::Identity(i) => AppError::UpstreamAuth(i.to_string()),
            AuthFlowError::Session(s) => AppError::from(s),
            AuthFlowError::Store(s) => AppError::from(s),
        }
    }
}

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        AppError::NotFound(e.to_string())
    }
}

impl From<FormRejection> for AppError {
    fn from(e: FormRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<UnknownService> for AppError {
    fn from(e: UnknownService) -> Self {
        AppError::NotFound(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::header::LOCATION;
    use referralshare_core::services::ServiceId;
    use referralshare_core::validation::ValidationError;

    use super::*;

    #[test]
    fn not_authenticated_redirects_to_login() {
        let resp = AppError::NotAuthenticated.into_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[LOCATION], routes::GET_AUTH_LOGIN);
    }

    #[test]
    fn validation_names_the_service() {
        let err = AppError::from(ProfileError::Validation(ValidationError {
            service: ServiceId::SofiMoney,
        }));
        assert!(matches!(&err, AppError::Validation(m) if m == "SoFi Money URL invalid"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_failures_are_service_unavailable() {
        let timeout = AppError::from(StoreError::Timeout(Duration::from_secs(5)));
        assert_eq!(timeout.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
        let session = AppError::from(SessionError::Unavailable("connection refused".into()));
        assert_eq!(session.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn no_participants_is_not_found() {
        let err = AppError::from(DispatchError::NoParticipants(ServiceId::Uber));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
