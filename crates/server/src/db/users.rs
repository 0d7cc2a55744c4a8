//! User repository for database operations.
//!
//! Queries are checked at runtime; rows are decoded into `UserRow` and then
//! validated into the `User` domain type.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use fairweather_core::{Email, TemperatureUnit, UserId, Username};

use super::{RepositoryError, conflict_on_unique, to_timestamp};
use crate::models::User;

pub const USERNAME_TAKEN: &str = "Username already exists";
pub const EMAIL_TAKEN: &str = "Email already exists";

const USER_COLUMNS: &str = "id, username, email, temperature_unit, created_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    temperature_unit: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let temperature_unit = row
            .temperature_unit
            .parse::<TemperatureUnit>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            email,
            temperature_unit,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by their exact username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
                .bind(username)
                .fetch_optional(self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<UserWithHashRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user = User::try_from(row.user)?;
        Ok(Some((user, row.password_hash)))
    }

    /// Create a new user with a hashed password.
    ///
    /// Username uniqueness is checked before email uniqueness so the
    /// conflict message names the first clash. Checks and insert are separate
    /// autocommit statements, never a deferred transaction: its WAL read
    /// snapshot can't be upgraded to a write once another writer commits.
    /// The unique indexes settle any race.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &Username,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let username_taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
                .bind(username)
                .fetch_one(self.pool)
                .await?;
        if username_taken {
            return Err(RepositoryError::Conflict(USERNAME_TAKEN.to_owned()));
        }

        let email_taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
                .bind(email)
                .fetch_one(self.pool)
                .await?;
        if email_taken {
            return Err(RepositoryError::Conflict(EMAIL_TAKEN.to_owned()));
        }

        let row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO users (username, email, password_hash, temperature_unit, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(TemperatureUnit::default())
        .bind(to_timestamp(Utc::now()))
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            // A concurrent registration won the race after our checks
            let message = if is_email_violation(&e) {
                EMAIL_TAKEN
            } else {
                USERNAME_TAKEN
            };
            conflict_on_unique(e, message)
        })?;

        User::try_from(row)
    }

    /// Update a user's temperature unit and return the updated user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_temperature_unit(
        &self,
        id: UserId,
        unit: TemperatureUnit,
    ) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users SET temperature_unit = ? WHERE id = ? RETURNING {USER_COLUMNS}"
        ))
        .bind(unit)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)
            .and_then(User::try_from)
    }

    /// Delete a user and all of their favorites in one transaction.
    ///
    /// # Returns
    ///
    /// The number of favorites removed along with the account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: UserId) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let favorites = sqlx::query("DELETE FROM favorite_cities WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let user = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if user.rows_affected() == 0 {
            // Dropping the transaction rolls it back
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        Ok(favorites.rows_affected())
    }
}

fn is_email_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.message().contains("users.email"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support::{FileDb, memory_pool};

    fn username(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let pool = memory_pool().await;
        let repo = UserRepository::new(&pool);

        let created = repo
            .create(&username("alice"), &email("a@x.com"), "hash")
            .await
            .unwrap();
        assert_eq!(created.username.as_str(), "alice");
        assert_eq!(created.email.as_str(), "a@x.com");
        assert_eq!(created.temperature_unit, TemperatureUnit::Celsius);

        let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id, created);

        let by_name = repo.get_by_username(&username("alice")).await.unwrap();
        assert_eq!(by_name.map(|u| u.id), Some(created.id));

        assert!(repo.get_by_username(&username("Alice")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_with_password_hash() {
        let pool = memory_pool().await;
        let repo = UserRepository::new(&pool);
        repo.create(&username("alice"), &email("a@x.com"), "$argon2id$stub")
            .await
            .unwrap();

        let (user, hash) = repo
            .get_with_password_hash(&username("alice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.username.as_str(), "alice");
        assert_eq!(hash, "$argon2id$stub");

        assert!(
            repo.get_with_password_hash(&username("bob"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_create_duplicate_username() {
        let pool = memory_pool().await;
        let repo = UserRepository::new(&pool);
        repo.create(&username("alice"), &email("a@x.com"), "h")
            .await
            .unwrap();

        // Username is reported even when the email also clashes
        let err = repo
            .create(&username("alice"), &email("a@x.com"), "h")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(ref m) if m == USERNAME_TAKEN));

        let err = repo
            .create(&username("alice"), &email("other@x.com"), "h")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(ref m) if m == USERNAME_TAKEN));
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let pool = memory_pool().await;
        let repo = UserRepository::new(&pool);
        repo.create(&username("alice"), &email("a@x.com"), "h")
            .await
            .unwrap();

        let err = repo
            .create(&username("bob"), &email("a@x.com"), "h")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(ref m) if m == EMAIL_TAKEN));
    }

    #[tokio::test]
    async fn test_update_temperature_unit() {
        let pool = memory_pool().await;
        let repo = UserRepository::new(&pool);
        let user = repo
            .create(&username("alice"), &email("a@x.com"), "h")
            .await
            .unwrap();

        let updated = repo
            .update_temperature_unit(user.id, TemperatureUnit::Fahrenheit)
            .await
            .unwrap();
        assert_eq!(updated.temperature_unit, TemperatureUnit::Fahrenheit);

        let reloaded = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.temperature_unit, TemperatureUnit::Fahrenheit);
    }

    #[tokio::test]
    async fn test_update_temperature_unit_missing_user() {
        let pool = memory_pool().await;
        let repo = UserRepository::new(&pool);

        let err = repo
            .update_temperature_unit(UserId::new(42), TemperatureUnit::Fahrenheit)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_removes_favorites() {
        let pool = memory_pool().await;
        let repo = UserRepository::new(&pool);
        let user = repo
            .create(&username("alice"), &email("a@x.com"), "h")
            .await
            .unwrap();

        for city in ["Paris", "Oslo"] {
            sqlx::query(
                "INSERT INTO favorite_cities (user_id, city_name, added_at) VALUES (?, ?, ?)",
            )
            .bind(user.id)
            .bind(city)
            .bind(to_timestamp(Utc::now()))
            .execute(&pool)
            .await
            .unwrap();
        }

        assert_eq!(repo.delete(user.id).await.unwrap(), 2);
        assert!(repo.get_by_id(user.id).await.unwrap().is_none());

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favorite_cities")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let pool = memory_pool().await;
        let repo = UserRepository::new(&pool);

        let err = repo.delete(UserId::new(7)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_all_succeed() {
        let db = FileDb::new(8).await;

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let pool = db.pool.clone();
                tokio::spawn(async move {
                    UserRepository::new(&pool)
                        .create(
                            &username(&format!("user{i}")),
                            &email(&format!("user{i}@x.com")),
                            "h",
                        )
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 32);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_username_is_conflict() {
        let db = FileDb::new(8).await;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pool = db.pool.clone();
                tokio::spawn(async move {
                    UserRepository::new(&pool)
                        .create(&username("alice"), &email(&format!("a{i}@x.com")), "h")
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(RepositoryError::Conflict(m)) => assert_eq!(m, USERNAME_TAKEN),
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(created, 1);
    }
}
