//! Favorite city domain types.

use chrono::{DateTime, Utc};

use fairweather_core::{CityName, FavoriteId, UserId};

/// A city bookmarked by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Favorite {
    /// Database ID of this favorite.
    pub id: FavoriteId,
    /// User who owns this favorite.
    pub user_id: UserId,
    /// Display name of the city.
    pub city_name: CityName,
    /// Latitude in degrees, if known.
    pub latitude: Option<f64>,
    /// Longitude in degrees, if known.
    pub longitude: Option<f64>,
    /// When the city was bookmarked.
    pub added_at: DateTime<Utc>,
}

/// A validated favorite waiting to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFavorite {
    pub city_name: CityName,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
