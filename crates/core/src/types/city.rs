//! Favorite city name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CityName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CityNameError {
    /// The input is empty or whitespace only.
    #[error("city name cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("city name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// The display name of a bookmarked city, e.g. `"Paris"`.
///
/// A user's favorites are unique by exact city name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CityName(String);

impl CityName {
    /// Maximum length of a city name (the width of the `city_name` column).
    pub const MAX_LENGTH: usize = 100;

    /// Parse a `CityName` from a string.
    ///
    /// # Errors
    ///
    /// Returns `CityNameError::Empty` for empty or whitespace-only input and
    /// `CityNameError::TooLong` past 100 characters.
    pub fn parse(s: &str) -> Result<Self, CityNameError> {
        if s.trim().is_empty() {
            return Err(CityNameError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(CityNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the city name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for CityName {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for CityName {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&self.0, buf)
    }
}
