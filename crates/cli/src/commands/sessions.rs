//! Session maintenance commands.

use fairweather_server::middleware::delete_expired_sessions;
use thiserror::Error;

use super::{CommandError, connect};

#[derive(Debug, Error)]
pub enum SessionsError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Session store error: {0}")]
    Store(String),
}

/// Delete sessions whose inactivity expiry has passed.
pub async fn prune() -> Result<(), SessionsError> {
    let pool = connect().await?;

    tracing::info!("Deleting expired sessions...");
    delete_expired_sessions(&pool)
        .await
        .map_err(|e| SessionsError::Store(e.to_string()))?;

    tracing::info!("Expired sessions deleted");
    Ok(())
}
