//! Unified error type for the backend.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Gwad'Air API error: {0}")]
    GwadAir(String),

    #[error("Open-Meteo API error: {0}")]
    OpenMeteo(String),

    #[error("OpenWeatherMap API error: {0}")]
    OpenWeather(String),

    #[error("Météo-France API error: {0}")]
    MeteoFrance(String),

    #[error("KV store error: {0}")]
    Kv(String),

    #[error("Rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
