//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use fairweather_core::{Email, TemperatureUnit, UserId, Username};

/// A registered account (domain type).
///
/// The password hash is deliberately absent; it is only loaded by
/// `UserRepository::get_with_password_hash` during login.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: Username,
    /// Contact email address.
    pub email: Email,
    /// Preferred display unit for temperatures.
    pub temperature_unit: TemperatureUnit,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
