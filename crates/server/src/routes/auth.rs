//! Authentication route handlers.
//!
//! Registration, login, logout and the session probe used by the frontend
//! on page load.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use fairweather_core::{Email, Username};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User, session_keys};
use crate::routes::views::{MessageResponse, UserView};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl RegisterRequest {
    fn validate(self) -> Result<(Username, Email, String)> {
        let (Some(username), Some(email), Some(password)) = (
            non_empty(self.username),
            non_empty(self.email),
            non_empty(self.password),
        ) else {
            return Err(AppError::Validation("Missing required fields".to_string()));
        };

        Ok((Username::parse(&username)?, Email::parse(&email)?, password))
    }
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    fn validate(self) -> Result<(String, String)> {
        match (non_empty(self.username), non_empty(self.password)) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(AppError::Validation(
                "Missing username or password".to_string(),
            )),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// =============================================================================
// Response Types
// =============================================================================

/// Response for a successful register or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: UserView,
}

/// Response for the session probe.
#[derive(Debug, Serialize)]
pub struct CheckAuthResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/register`
///
/// # Errors
///
/// Returns 400 for missing fields or a taken username/email.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let (username, email, password) = body.validate()?;

    let user = AuthService::new(state.pool())
        .register(&username, &email, &password)
        .await?;

    start_session(&session, &user).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully",
            user: UserView::from(&user),
        }),
    ))
}

/// `POST /api/login`
///
/// # Errors
///
/// Returns 400 for missing fields and 401 for a wrong username or password.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let (raw_username, password) = body.validate()?;

    // A name that could never be registered can't match an account
    let result = match Username::parse(&raw_username) {
        Ok(username) => {
            AuthService::new(state.pool())
                .login(&username, &password)
                .await
        }
        Err(_) => Err(AuthError::InvalidCredentials),
    };

    let user = match result {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!(username = %raw_username, "Failed login attempt");
            return Err(AuthError::InvalidCredentials.into());
        }
        Err(e) => return Err(e.into()),
    };

    start_session(&session, &user).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    Ok(Json(AuthResponse {
        message: "Login successful",
        user: UserView::from(&user),
    }))
}

/// `POST /api/logout`
///
/// Succeeds whether or not a session exists.
///
/// # Errors
///
/// Returns 500 if the session store fails.
pub async fn logout(session: Session) -> Result<Json<MessageResponse>> {
    if let Ok(Some(current)) = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
    {
        tracing::info!(user_id = %current.id, username = %current.username, "User logged out");
    }

    clear_current_user(&session).await?;
    clear_sentry_user();

    Ok(Json(MessageResponse {
        message: "Logout successful",
    }))
}

/// `GET /api/check-auth`
pub async fn check_auth(OptionalAuth(user): OptionalAuth) -> Json<CheckAuthResponse> {
    Json(CheckAuthResponse {
        authenticated: user.is_some(),
        user: user.as_ref().map(UserView::from),
    })
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, user).await?;
    set_sentry_user(&user.id, Some(user.username.as_str()));
    Ok(())
}
