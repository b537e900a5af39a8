//! Per-resource time-to-live, in seconds.

/// Gwad'Air air quality.
pub const AIR_QUALITY: u64 = 180;
/// Open-Meteo current conditions.
pub const CURRENT_WEATHER: u64 = 900;
/// OpenWeatherMap current conditions.
pub const WEATHER: u64 = 900;
/// Multi-day forecasts.
pub const FORECAST: u64 = 10_800;
/// Météo-France vigilance.
pub const VIGILANCE: u64 = 300;
/// Static water-cut schedule.
pub const WATER_CUTS: u64 = 86_400;
