//! Cache keys. Each key holds exactly one response shape.

pub const AIR_QUALITY: &str = "air_quality";
pub const WEATHER: &str = "weather";
pub const WEATHER_OWM: &str = "weather_owm";
pub const FORECAST_ALL: &str = "forecast_all";
pub const VIGILANCE: &str = "vigilance";
pub const WATER_CUTS: &str = "water_cuts";

/// Open-Meteo forecast for one commune.
pub fn forecast(code_zone: &str) -> String {
    format!("forecast_{}", code_zone)
}

/// OpenWeatherMap forecast for one commune.
pub fn forecast_owm(code_zone: &str) -> String {
    format!("forecast_owm_{}", code_zone)
}
