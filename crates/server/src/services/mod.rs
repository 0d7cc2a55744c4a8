//! Business logic services.
//!
//! - `auth` - Account registration, password login and preferences

pub mod auth;

pub use auth::{AuthError, AuthService};
