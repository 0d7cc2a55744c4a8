//! Fairweather Core - Shared domain types.
//!
//! This crate provides the types shared by every Fairweather component:
//! - `server` - The JSON API for accounts, sessions and favorite cities
//! - `cli` - Operator tooling for migrations and account maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Database encoding is available behind the `sqlite` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, usernames, emails, city names and
//!   the temperature unit preference

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
