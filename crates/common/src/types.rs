//! Wire types served to the dashboard.
//!
//! Field names match the JSON the frontend already consumes, so most structs
//! keep snake_case French-flavoured keys (`lib_zone`, `code_zone`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Air quality ───────────────────────────────────────────────────────

/// One commune's Gwad'Air attributes. Upstream fields pass through untouched
/// apart from `code_zone`, `date_ech` and `date_dif`.
pub type AirQualityData = serde_json::Map<String, serde_json::Value>;

/// Air quality keyed by INSEE commune code.
pub type AirQualityDataMap = BTreeMap<String, AirQualityData>;

// ── Current weather ───────────────────────────────────────────────────

/// Current conditions for one commune.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub lib_zone: String,
    pub code_zone: String,
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_deg: Option<f64>,
    pub wind_gust: Option<f64>,
    pub weather_main: String,
    pub weather_description: String,
    pub weather_icon: String,
    pub clouds: Option<f64>,
    pub visibility: Option<f64>,
    pub dew_point: Option<f64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub timezone: Option<i64>,
    pub rain_1h: Option<f64>,
    pub rain_3h: Option<f64>,
    pub uv_index: Option<f64>,
    /// WMO code (Open-Meteo only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<i32>,
    /// Day/night flag (Open-Meteo only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_day: Option<bool>,
}

impl WeatherData {
    /// Entry served for a commune whose upstream call failed.
    pub fn unavailable(code_zone: &str, lib_zone: &str, icon: &str) -> Self {
        Self {
            lib_zone: lib_zone.to_string(),
            code_zone: code_zone.to_string(),
            temperature: None,
            feels_like: None,
            temp_min: None,
            temp_max: None,
            humidity: None,
            pressure: None,
            wind_speed: None,
            wind_deg: None,
            wind_gust: None,
            weather_main: "N/A".into(),
            weather_description: "Données non disponibles".into(),
            weather_icon: icon.to_string(),
            clouds: None,
            visibility: None,
            dew_point: None,
            sunrise: None,
            sunset: None,
            timezone: None,
            rain_1h: None,
            rain_3h: None,
            uv_index: None,
            weather_code: None,
            is_day: None,
        }
    }
}

pub type WeatherDataMap = BTreeMap<String, WeatherData>;

// ── Open-Meteo forecast ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub time: String,
    pub hour: String,
    pub timestamp: i64,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub precipitation: f64,
    pub precipitation_probability: f64,
    pub weather_code: i32,
    pub weather_main: String,
    pub weather_description: String,
    pub weather_icon: String,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub clouds: f64,
    pub is_day: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: String,
    pub date_formatted: String,
    pub day_name: String,
    pub temp_min: f64,
    pub temp_max: f64,
    pub feels_like_min: f64,
    pub feels_like_max: f64,
    pub weather_code: i32,
    pub weather_main: String,
    pub weather_description: String,
    pub weather_icon: String,
    pub precipitation_sum: f64,
    pub precipitation_probability: f64,
    pub wind_speed_max: f64,
    pub wind_gusts_max: f64,
    pub wind_direction: f64,
    pub uv_index: f64,
    pub sunrise: String,
    pub sunset: String,
    pub hourly: Vec<HourlyForecast>,
}

/// Multi-day forecast for one commune.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastData {
    pub code_zone: String,
    pub lib_zone: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub daily: Vec<DailyForecast>,
    /// Epoch milliseconds.
    pub last_updated: i64,
}

pub type ForecastDataMap = BTreeMap<String, ForecastData>;

// ── OpenWeatherMap forecast ───────────────────────────────────────────

/// One 3-hour step of the OpenWeatherMap forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwmHourlyForecast {
    pub time: String,
    pub timestamp: i64,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub weather_main: String,
    pub weather_description: String,
    pub weather_icon: String,
    pub clouds: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub pop: f64,
    pub rain_3h: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: String,
    pub temp_min: f64,
    pub temp_max: f64,
    pub hourly: Vec<OwmHourlyForecast>,
    pub main_weather: String,
    pub main_weather_description: String,
    pub main_weather_icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwmCity {
    pub name: String,
    pub coord: Coord,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub timezone: i64,
}

/// Five-day forecast keyed by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwmForecastData {
    pub code_zone: String,
    pub lib_zone: String,
    pub daily: BTreeMap<String, DailySummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<OwmCity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ── Vigilance ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VigilanceRisk {
    #[serde(rename = "type")]
    pub kind: String,
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VigilanceData {
    pub department: String,
    pub department_name: String,
    pub level: i32,
    pub color: String,
    pub label: String,
    pub risks: Vec<VigilanceRisk>,
    /// Epoch milliseconds.
    pub last_update: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VigilanceData {
    /// Build a bulletin for Guadeloupe at the given level.
    pub fn guadeloupe(level: i32, risks: Vec<VigilanceRisk>, last_update: i64) -> Self {
        let (level, color, label) = vigilance_level_info(level);
        Self {
            department: "971".into(),
            department_name: "Guadeloupe".into(),
            level,
            color: color.into(),
            label: label.into(),
            risks,
            last_update,
            error: None,
        }
    }

    /// Green bulletin carrying an error message; served whenever the real
    /// bulletin cannot be obtained.
    pub fn fallback(error: impl Into<String>, last_update: i64) -> Self {
        let mut data = Self::guadeloupe(1, Vec::new(), last_update);
        data.error = Some(error.into());
        data
    }
}

/// Map a vigilance level to `(level, color, label)`. Unknown levels fall back
/// to green (level 1).
pub fn vigilance_level_info(level: i32) -> (i32, &'static str, &'static str) {
    match level {
        -1 => (-1, "#CCCCCC", "Non disponible"),
        0 => (0, "#28d761", "Vert"),
        1 => (1, "#28d761", "Vert"),
        2 => (2, "#FFFF00", "Jaune"),
        3 => (3, "#FF9900", "Orange"),
        4 => (4, "#FF0000", "Rouge"),
        _ => (1, "#28d761", "Vert"),
    }
}

/// Météo-France phenomenon id → French name.
pub fn phenomenon_name(id: i64) -> String {
    let name = match id {
        1 => "Vent",
        2 => "Pluie-inondation",
        3 => "Orages",
        4 => "Crues",
        5 => "Neige-verglas",
        6 => "Canicule",
        7 => "Grand froid",
        8 => "Avalanches",
        9 => "Vagues-submersion",
        10 => "Mer-houle",
        other => return format!("Phénomène {}", other),
    };
    name.to_string()
}

// ── Water cuts ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterCutDetail {
    pub secteur: String,
    pub horaires: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones_alimentation_favorables: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterCutData {
    pub commune: String,
    pub details: Vec<WaterCutDetail>,
}

pub type WaterCutsDataMap = BTreeMap<String, WaterCutData>;

// ── API envelopes ─────────────────────────────────────────────────────

/// Body returned on route failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub success: bool,
    pub error: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl ApiErrorBody {
    pub fn new(error: impl Into<String>, timestamp: i64) -> Self {
        Self {
            success: false,
            error: error.into(),
            timestamp,
        }
    }
}
