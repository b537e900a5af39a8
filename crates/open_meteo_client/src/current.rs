//! Current conditions (`current=` + today's `daily=` aggregates).

use chrono::Timelike;
use common::dates::{format_hhmm, now_local, parse_local_datetime};
use common::weather_codes::{short_label, weather_description, weather_icon};
use common::{round1, Commune, Error, WeatherData};
use serde::Deserialize;

pub const CURRENT_PARAMS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
precipitation,weather_code,wind_speed_10m,wind_direction_10m,wind_gusts_10m,cloud_cover,\
surface_pressure,is_day";

pub const CURRENT_DAILY_PARAMS: &str =
    "temperature_2m_max,temperature_2m_min,sunrise,sunset,uv_index_max,precipitation_sum";

/// Open-Meteo does not report visibility; the dashboard expects metres.
const DEFAULT_VISIBILITY_M: f64 = 10_000.0;

#[derive(Debug, Deserialize)]
pub struct CurrentResponse {
    pub current: CurrentBlock,
    #[serde(default)]
    pub daily: TodayBlock,
}

#[derive(Debug, Deserialize)]
pub struct CurrentBlock {
    #[serde(default)]
    pub time: String,
    pub temperature_2m: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<i32>,
    pub wind_speed_10m: Option<f64>,
    pub wind_direction_10m: Option<f64>,
    pub wind_gusts_10m: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub surface_pressure: Option<f64>,
    pub is_day: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TodayBlock {
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub sunrise: Vec<String>,
    #[serde(default)]
    pub sunset: Vec<String>,
    #[serde(default)]
    pub uv_index_max: Vec<Option<f64>>,
}

fn first(values: &[Option<f64>]) -> Option<f64> {
    values.first().copied().flatten()
}

/// Approximate dew point from temperature (°C) and relative humidity (%).
pub fn dew_point(temperature: f64, humidity: f64) -> f64 {
    temperature - (100.0 - humidity) / 5.0
}

/// Convert one Open-Meteo reply into the dashboard's current-weather shape.
pub fn normalize_current(commune: &Commune, resp: &CurrentResponse) -> Result<WeatherData, Error> {
    let current = &resp.current;
    let daily = &resp.daily;

    let temperature = current
        .temperature_2m
        .ok_or_else(|| Error::OpenMeteo(format!("no temperature for {}", commune.name)))?;

    let is_day = current.is_day.map(|flag| flag == 1);
    let hour = parse_local_datetime(&current.time)
        .map(|t| t.hour())
        .unwrap_or_else(|| now_local().hour());

    Ok(WeatherData {
        lib_zone: commune.name.to_string(),
        code_zone: commune.code.to_string(),
        temperature: Some(round1(temperature)),
        feels_like: current.apparent_temperature.map(round1),
        temp_min: first(&daily.temperature_2m_min).map(round1),
        temp_max: first(&daily.temperature_2m_max).map(round1),
        humidity: current.relative_humidity_2m,
        pressure: current.surface_pressure.map(f64::round),
        wind_speed: current.wind_speed_10m.map(round1),
        wind_deg: current.wind_direction_10m,
        wind_gust: current.wind_gusts_10m.filter(|g| *g != 0.0).map(round1),
        weather_main: short_label(current.weather_code),
        weather_description: weather_description(current.weather_code, is_day, Some(hour)),
        weather_icon: weather_icon(current.weather_code, hour).to_string(),
        clouds: current.cloud_cover,
        visibility: Some(DEFAULT_VISIBILITY_M),
        dew_point: current
            .relative_humidity_2m
            .map(|rh| round1(dew_point(temperature, rh))),
        sunrise: daily.sunrise.first().map(|s| format_hhmm(s)),
        sunset: daily.sunset.first().map(|s| format_hhmm(s)),
        timezone: Some(0),
        rain_1h: current.precipitation.filter(|p| *p > 0.0),
        rain_3h: None,
        uv_index: first(&daily.uv_index_max).filter(|uv| *uv != 0.0).map(round1),
        weather_code: current.weather_code,
        is_day,
    })
}
