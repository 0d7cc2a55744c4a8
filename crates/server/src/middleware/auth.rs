//! Authentication extractors.
//!
//! The session only stores a `CurrentUser` identity; both extractors reload
//! the account on every request. A session naming an account that no longer
//! exists is flushed and treated as anonymous. Session store failures
//! surface as 500s rather than as a logged-out user.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentUser, User, session_keys};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Message returned for requests that need a session but have none.
pub const NOT_AUTHENTICATED: &str = "Not authenticated";

/// Extractor that requires an authenticated user.
///
/// Rejects with 401 `{"error": "Not authenticated"}` when there is no
/// session user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub User);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state)
            .await?
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized(NOT_AUTHENTICATED.to_string()))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged in.
pub struct OptionalAuth(pub Option<User>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_user(parts, state).await?))
    }
}

async fn resolve_user(parts: &Parts, state: &AppState) -> Result<Option<User>, AppError> {
    // Set by SessionManagerLayer
    let Some(session) = parts.extensions.get::<Session>() else {
        return Ok(None);
    };

    let current = match session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
        Ok(current) => current,
        // Payload written by an incompatible build; start over
        Err(tower_sessions::session::Error::SerdeJson(e)) => {
            tracing::warn!(error = %e, "Undecodable session payload, clearing it");
            session.flush().await?;
            None
        }
        Err(e) => return Err(e.into()),
    };
    let Some(current) = current else {
        return Ok(None);
    };

    match AuthService::new(state.pool()).get_user(current.id).await {
        Ok(user) => Ok(Some(user)),
        Err(AuthError::UserNotFound) => {
            tracing::info!(
                user_id = %current.id,
                username = %current.username,
                "Session refers to a deleted account, clearing it"
            );
            session.flush().await?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Bind the session to a user after login or registration.
///
/// The session ID is rotated first so a pre-login ID can't be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &User,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_USER, CurrentUser::from(user))
        .await
}

/// Clear the session entirely (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be deleted from the store.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
