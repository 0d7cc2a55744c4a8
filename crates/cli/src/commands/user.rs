//! User account commands.
//!
//! Accounts are only ever removed by an operator; the API has no
//! self-service deletion.

use fairweather_core::{Username, UsernameError};
use fairweather_server::db::{RepositoryError, UserRepository};
use thiserror::Error;

use super::{CommandError, connect};

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("No user named '{0}'")]
    NotFound(String),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Delete a user and their favorites in one transaction.
///
/// Sessions still pointing at the account are rejected by the server on
/// their next request.
pub async fn delete(username: &str) -> Result<(), UserError> {
    let username = Username::parse(username)?;
    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    let user = users
        .get_by_username(&username)
        .await?
        .ok_or_else(|| UserError::NotFound(username.to_string()))?;

    let favorites = users.delete(user.id).await.map_err(|e| match e {
        RepositoryError::NotFound => UserError::NotFound(username.to_string()),
        other => UserError::Repository(other),
    })?;

    tracing::info!(
        user_id = %user.id,
        username = %username,
        favorites_removed = favorites,
        "User deleted"
    );
    Ok(())
}
