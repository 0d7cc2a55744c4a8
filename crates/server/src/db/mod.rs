//! Database operations for the `SQLite` store.
//!
//! ## Tables
//!
//! - `users` - Accounts with hashed passwords and display preferences
//! - `favorite_cities` - Per-user bookmarked cities
//! - `tower_sessions` - Session storage (owned by `tower-sessions-sqlx-store`)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p fairweather-cli -- migrate
//! ```

pub mod favorites;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;
use tower_sessions_sqlx_store::SqliteStore;

pub use favorites::FavoriteRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Errors from applying migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("schema migration failed: {0}")]
    Schema(#[from] sqlx::migrate::MigrateError),

    #[error("session table migration failed: {0}")]
    Sessions(#[source] sqlx::Error),
}

/// Create a `SQLite` connection pool.
///
/// In-memory databases exist per connection, so a `:memory:` URL gets a
/// single connection that is never recycled.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(
    database_url: &SecretString,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    let url = database_url.expose_secret();
    let in_memory = is_in_memory(url);

    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));
    let options = if in_memory {
        options
    } else {
        options.journal_mode(SqliteJournalMode::Wal)
    };

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(max_connections)
    };

    pool_options
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Apply the embedded schema migrations and create the session table.
///
/// # Errors
///
/// Returns `MigrationError` if either migration step fails.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrationError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    SqliteStore::new(pool.clone())
        .migrate()
        .await
        .map_err(MigrationError::Sessions)?;
    Ok(())
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Format a timestamp for a `TEXT` column.
///
/// Fixed-width RFC 3339 in UTC, so lexical order matches chronological order.
pub(crate) fn to_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_in_memory() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:weather?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://weather_app.db?mode=rwc"));
    }

    #[test]
    fn test_timestamps_sort_chronologically() {
        let earlier = DateTime::parse_from_rfc3339("2026-10-16T09:59:59.9Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = DateTime::parse_from_rfc3339("2026-10-16T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(to_timestamp(later), "2026-10-16T10:00:00.000000Z");
        assert!(to_timestamp(earlier) < to_timestamp(later));
    }

    #[tokio::test]
    async fn test_migrations_create_tables() {
        let pool = test_support::memory_pool().await;

        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();

        assert!(tables.iter().any(|t| t == "users"));
        assert!(tables.iter().any(|t| t == "favorite_cities"));
        assert!(tables.iter().any(|t| t == "tower_sessions"));
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = test_support::memory_pool().await;
        run_migrations(&pool).await.unwrap();
    }
}
