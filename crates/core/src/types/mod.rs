//! Core types for Fairweather.
//!
//! This module provides type-safe wrappers for the domain's validated values.

pub mod city;
pub mod email;
pub mod id;
pub mod temperature;
pub mod username;

pub use city::{CityName, CityNameError};
pub use email::{Email, EmailError};
pub use id::*;
pub use temperature::{TemperatureUnit, TemperatureUnitError};
pub use username::{Username, UsernameError};
