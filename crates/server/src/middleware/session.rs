//! Session middleware configuration.
//!
//! Sets up `SQLite`-backed sessions using tower-sessions.

use sqlx::SqlitePool;
use tower_sessions::cookie::{SameSite, time};
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::ServerConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "fw_session";

/// Create the session layer with the `SQLite` store.
///
/// The session table must already exist (see `db::run_migrations`).
///
/// # Arguments
///
/// * `pool` - `SQLite` connection pool
/// * `config` - Server configuration (for cookie security and expiry)
#[must_use]
pub fn create_session_layer(
    pool: &SqlitePool,
    config: &ServerConfig,
) -> SessionManagerLayer<SqliteStore> {
    let store = SqliteStore::new(pool.clone());
    let ttl = i64::try_from(config.session_ttl.as_secs()).unwrap_or(i64::MAX);

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(ttl)))
        .with_secure(config.secure_cookies())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Remove expired sessions from the store.
///
/// # Errors
///
/// Returns an error if the store cannot be queried.
pub async fn delete_expired_sessions(
    pool: &SqlitePool,
) -> Result<(), tower_sessions::session_store::Error> {
    SqliteStore::new(pool.clone()).delete_expired().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    #[tokio::test]
    async fn test_delete_expired_sessions_keeps_live_rows() {
        let pool = memory_pool().await;

        sqlx::query("INSERT INTO tower_sessions (id, data, expiry_date) VALUES (?, ?, ?)")
            .bind("expired")
            .bind(Vec::<u8>::new())
            .bind(0_i64)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO tower_sessions (id, data, expiry_date) VALUES (?, ?, ?)")
            .bind("live")
            .bind(Vec::<u8>::new())
            .bind(i64::MAX)
            .execute(&pool)
            .await
            .unwrap();

        delete_expired_sessions(&pool).await.unwrap();

        let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM tower_sessions")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(ids, vec!["live".to_string()]);
    }
}
