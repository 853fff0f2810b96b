//! Profile request handlers.

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::{Extension, Json};
use referralshare_core::models::UserRecord;
use referralshare_core::services::ServiceId;
use referralshare_core::validation::ProfileSubmission;
use serde::Deserialize;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;

/// `GET /profile`: the signed-in user's record.
pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<UserRecord>> {
    let record = state
        .profiles
        .load(&user.0)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no profile for {}", user.0)))?;
    Ok(Json(record))
}

/// Submitted profile form. Missing fields are empty (not participating);
/// the capitalised names are the legacy form field names.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default, alias = "Sofi_money")]
    pub sofi_money: String,
    #[serde(default, alias = "Sofi_invest")]
    pub sofi_invest: String,
    #[serde(default, alias = "Robinhood")]
    pub robinhood: String,
    #[serde(default, alias = "Amazon")]
    pub amazon: String,
    #[serde(default, alias = "Airbnb")]
    pub airbnb: String,
    #[serde(default, alias = "Grubhub")]
    pub grubhub: String,
    #[serde(default, alias = "Doordash")]
    pub doordash: String,
    #[serde(default, alias = "Uber")]
    pub uber: String,
}

impl From<ProfileForm> for ProfileSubmission {
    fn from(form: ProfileForm) -> Self {
        ProfileSubmission::new()
            .with(ServiceId::SofiMoney, form.sofi_money)
            .with(ServiceId::SofiInvest, form.sofi_invest)
            .with(ServiceId::Robinhood, form.robinhood)
            .with(ServiceId::Amazon, form.amazon)
            .with(ServiceId::Airbnb, form.airbnb)
            .with(ServiceId::Grubhub, form.grubhub)
            .with(ServiceId::Doordash, form.doordash)
            .with(ServiceId::Uber, form.uber)
    }
}

/// `POST /updateuser`: validate and save all referral links.
///
/// A body that does not decode as the form is a validation error, answered
/// with the same JSON body as a rejected link.
pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    form: Result<Form<ProfileForm>, FormRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let Form(form) = form?;
    state.profiles.update_profile(&user.0, form.into()).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_maps_each_field_to_its_service() {
        let form = ProfileForm {
            sofi_money: "m".into(),
            uber: "u".into(),
            ..Default::default()
        };
        let submission = ProfileSubmission::from(form);
        assert_eq!(submission.get(ServiceId::SofiMoney), "m");
        assert_eq!(submission.get(ServiceId::Uber), "u");
        assert_eq!(submission.get(ServiceId::Amazon), "");
    }
}
