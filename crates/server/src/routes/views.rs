//! JSON representations of domain objects.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fairweather_core::{CityName, Email, FavoriteId, TemperatureUnit, UserId, Username};

use crate::models::{Favorite, User};

/// Public view of an account. Never includes the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub temperature_unit: TemperatureUnit,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            temperature_unit: user.temperature_unit,
        }
    }
}

/// Public view of a favorite city. `added_at` is ISO-8601.
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteView {
    pub id: FavoriteId,
    pub city_name: CityName,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub added_at: DateTime<Utc>,
}

impl From<&Favorite> for FavoriteView {
    fn from(favorite: &Favorite) -> Self {
        Self {
            id: favorite.id,
            city_name: favorite.city_name.clone(),
            latitude: favorite.latitude,
            longitude: favorite.longitude,
            added_at: favorite.added_at,
        }
    }
}

/// Body of responses that only carry a confirmation.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
