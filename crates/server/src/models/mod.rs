//! Domain models for the weather API.

pub mod favorite;
pub mod session;
pub mod user;

pub use favorite::{Favorite, NewFavorite};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
