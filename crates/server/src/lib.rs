//! Fairweather API server library.
//!
//! Accounts, cookie sessions and per-user favorite cities behind a JSON API.
//! Exposed as a library so the CLI and the integration tests share the same
//! database layer and router as the binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use app::build_router;
pub use config::ServerConfig;
pub use state::AppState;
