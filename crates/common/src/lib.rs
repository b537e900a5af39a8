//! Shared types, config, and error definitions for the Gwad'Alerte backend.

pub mod communes;
pub mod config;
pub mod dates;
pub mod error;
pub mod types;
pub mod weather_codes;

pub use communes::{find_commune, is_valid_code_zone, Commune, COMMUNES};
pub use config::AppConfig;
pub use error::Error;
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
