//! Favorite city route handlers (requires auth).

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use fairweather_core::{CityName, FavoriteId};

use crate::db::{FavoriteRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::NewFavorite;
use crate::routes::views::{FavoriteView, MessageResponse};
use crate::state::AppState;

const FAVORITE_NOT_FOUND: &str = "Favorite not found";

/// Request body for bookmarking a city.
#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub city_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl AddFavoriteRequest {
    fn validate(self) -> Result<NewFavorite> {
        let city_name = self
            .city_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::Validation("City name is required".to_string()))?;

        Ok(NewFavorite {
            city_name: CityName::parse(&city_name)?,
            latitude: check_coordinate("latitude", self.latitude, 90.0)?,
            longitude: check_coordinate("longitude", self.longitude, 180.0)?,
        })
    }
}

fn check_coordinate(name: &str, value: Option<f64>, limit: f64) -> Result<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() || v.abs() > limit => Err(AppError::Validation(format!(
            "{name} must be between -{limit} and {limit}"
        ))),
        other => Ok(other),
    }
}

/// Response listing a user's favorites.
#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<FavoriteView>,
}

/// Response for a newly bookmarked city.
#[derive(Debug, Serialize)]
pub struct AddFavoriteResponse {
    pub message: &'static str,
    pub favorite: FavoriteView,
}

/// `GET /api/favorites`
///
/// # Errors
///
/// Returns 401 without a session.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<FavoritesResponse>> {
    let favorites = FavoriteRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(FavoritesResponse {
        favorites: favorites.iter().map(FavoriteView::from).collect(),
    }))
}

/// `POST /api/favorites`
///
/// # Errors
///
/// Returns 400 for a missing city name, bad coordinates or a city that is
/// already bookmarked, and 401 without a session.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<AddFavoriteResponse>)> {
    let new_favorite = body.validate()?;

    let favorite = FavoriteRepository::new(state.pool())
        .create(user.id, &new_favorite)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(message) => AppError::Conflict(message),
            RepositoryError::NotFound => AppError::NotFound("User not found".to_string()),
            other => AppError::Database(other),
        })?;

    tracing::info!(
        user_id = %user.id,
        favorite_id = %favorite.id,
        city = %favorite.city_name,
        "Favorite added"
    );

    Ok((
        StatusCode::CREATED,
        Json(AddFavoriteResponse {
            message: "City added to favorites",
            favorite: FavoriteView::from(&favorite),
        }),
    ))
}

/// `DELETE /api/favorites/{id}`
///
/// # Errors
///
/// Returns 401 without a session and 404 when the ID is malformed, unknown,
/// or belongs to another user.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Ok(Path(id)) = id else {
        return Err(AppError::NotFound(FAVORITE_NOT_FOUND.to_string()));
    };
    let id = FavoriteId::new(id);

    let deleted = FavoriteRepository::new(state.pool())
        .delete(user.id, id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound(FAVORITE_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = %user.id, favorite_id = %id, "Favorite removed");

    Ok(Json(MessageResponse {
        message: "City removed from favorites",
    }))
}
