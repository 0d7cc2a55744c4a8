//! Favorite city repository.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use fairweather_core::{CityName, FavoriteId, UserId};

use super::{RepositoryError, conflict_on_unique, to_timestamp};
use crate::models::{Favorite, NewFavorite};

pub const CITY_TAKEN: &str = "City already in favorites";

const FAVORITE_COLUMNS: &str = "id, user_id, city_name, latitude, longitude, added_at";

#[derive(Debug, FromRow)]
struct FavoriteRow {
    id: i64,
    user_id: i64,
    city_name: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    added_at: DateTime<Utc>,
}

impl TryFrom<FavoriteRow> for Favorite {
    type Error = RepositoryError;

    fn try_from(row: FavoriteRow) -> Result<Self, Self::Error> {
        let city_name = CityName::parse(&row.city_name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid city name in database: {e}"))
        })?;

        Ok(Self {
            id: FavoriteId::new(row.id),
            user_id: UserId::new(row.user_id),
            city_name,
            latitude: row.latitude,
            longitude: row.longitude,
            added_at: row.added_at,
        })
    }
}

/// Repository for a user's favorite cities.
pub struct FavoriteRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FavoriteRepository<'a> {
    /// Create a new favorites repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List a user's favorites, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Favorite>, RepositoryError> {
        let rows: Vec<FavoriteRow> = sqlx::query_as(&format!(
            "SELECT {FAVORITE_COLUMNS} FROM favorite_cities WHERE user_id = ? ORDER BY added_at, id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Favorite::try_from).collect()
    }

    /// Bookmark a city for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has this city.
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        favorite: &NewFavorite,
    ) -> Result<Favorite, RepositoryError> {
        let row: FavoriteRow = sqlx::query_as(&format!(
            r"
            INSERT INTO favorite_cities (user_id, city_name, latitude, longitude, added_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {FAVORITE_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(&favorite.city_name)
        .bind(favorite.latitude)
        .bind(favorite.longitude)
        .bind(to_timestamp(Utc::now()))
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            conflict_on_unique(e, CITY_TAKEN)
        })?;

        Favorite::try_from(row)
    }

    /// Delete one of a user's favorites.
    ///
    /// # Returns
    ///
    /// Returns `true` if the favorite was deleted, `false` if no favorite with
    /// that ID belongs to the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, user_id: UserId, id: FavoriteId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM favorite_cities WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
