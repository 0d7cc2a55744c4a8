//! Database migration command.
//!
//! Applies the schema migrations embedded in `fairweather-server`
//! (`crates/server/migrations/`) and creates the session table.

use fairweather_server::db::{self, MigrationError};
use thiserror::Error;

use super::{CommandError, connect};

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

/// Run all migrations against the configured database.
pub async fn run() -> Result<(), MigrateError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
