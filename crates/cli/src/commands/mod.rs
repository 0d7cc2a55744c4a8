//! CLI command implementations.

pub mod migrate;
pub mod sessions;
pub mod user;

use fairweather_server::config::{ConfigError, ServerConfig};
use fairweather_server::db;
use sqlx::SqlitePool;
use thiserror::Error;

/// Errors shared by all commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the database configured for the server.
pub async fn connect() -> Result<SqlitePool, CommandError> {
    let config = ServerConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    Ok(pool)
}
