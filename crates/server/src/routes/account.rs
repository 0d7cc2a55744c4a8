//! Account route handlers (requires auth).

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use fairweather_core::TemperatureUnit;

use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::routes::views::UserView;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Settings update request body.
///
/// Absent fields leave the stored value unchanged.
#[derive(Debug, Deserialize)]
pub struct SettingsRequest {
    pub temperature_unit: Option<String>,
}

impl SettingsRequest {
    fn validate(self) -> Result<Option<TemperatureUnit>> {
        self.temperature_unit
            .map(|unit| unit.parse::<TemperatureUnit>())
            .transpose()
            .map_err(AppError::from)
    }
}

/// Response for the current account.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserView,
}

/// Response for a settings update.
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub message: &'static str,
    pub temperature_unit: TemperatureUnit,
}

/// `GET /api/user`
pub async fn current_user(RequireAuth(user): RequireAuth) -> Json<UserResponse> {
    Json(UserResponse {
        user: UserView::from(&user),
    })
}

/// `PUT /api/settings`
///
/// # Errors
///
/// Returns 400 for an unknown unit, 401 without a session and 404 if the
/// account disappeared mid-request.
pub async fn update_settings(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<SettingsRequest>,
) -> Result<Json<SettingsResponse>> {
    let temperature_unit = match body.validate()? {
        Some(unit) => {
            let updated = AuthService::new(state.pool())
                .update_temperature_unit(user.id, unit)
                .await
                .map_err(|e| match e {
                    AuthError::UserNotFound => AppError::NotFound("User not found".to_string()),
                    other => AppError::Auth(other),
                })?;
            tracing::info!(user_id = %user.id, unit = %updated.temperature_unit, "Settings updated");
            updated.temperature_unit
        }
        None => user.temperature_unit,
    };

    Ok(Json(SettingsResponse {
        message: "Settings updated successfully",
        temperature_unit,
    }))
}
