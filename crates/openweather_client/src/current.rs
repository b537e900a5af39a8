//! `/weather` endpoint: current conditions.

use chrono::DateTime;
use common::dates::guadeloupe_offset;
use common::{round1, Commune, Error, WeatherData};
use serde::Deserialize;

/// Icon used when OpenWeatherMap gives none.
pub const DEFAULT_ICON: &str = "01d";

const MS_TO_KMH: f64 = 3.6;

#[derive(Debug, Deserialize)]
pub struct CurrentResponse {
    pub main: MainBlock,
    #[serde(default)]
    pub weather: Vec<WeatherBlock>,
    #[serde(default)]
    pub wind: WindBlock,
    #[serde(default)]
    pub clouds: CloudsBlock,
    pub visibility: Option<f64>,
    #[serde(default)]
    pub sys: SysBlock,
    pub timezone: Option<i64>,
    #[serde(default)]
    pub rain: RainBlock,
}

#[derive(Debug, Deserialize)]
pub struct MainBlock {
    pub temp: Option<f64>,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub temp_min: f64,
    #[serde(default)]
    pub temp_max: f64,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherBlock {
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct WindBlock {
    #[serde(default)]
    pub speed: f64,
    pub deg: Option<f64>,
    pub gust: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CloudsBlock {
    #[serde(default)]
    pub all: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SysBlock {
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RainBlock {
    #[serde(rename = "1h")]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h")]
    pub three_hours: Option<f64>,
}

/// m/s to km/h, one decimal.
pub fn to_kmh(speed_ms: f64) -> f64 {
    round1(speed_ms * MS_TO_KMH)
}

/// `HH:MM` in Guadeloupe time from a unix timestamp.
pub fn format_unix_hhmm(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.with_timezone(&guadeloupe_offset()).format("%H:%M").to_string())
}

/// Rough UV index from the local hour and cloud cover (%). Zero at night;
/// a tropical base of 8 around midday, 5 otherwise, dimmed by clouds.
pub fn approximate_uv(hour: u32, cloud_cover: f64) -> f64 {
    if !(6..=18).contains(&hour) {
        return 0.0;
    }
    let base = if (10..=14).contains(&hour) { 8.0 } else { 5.0 };
    let cloud_factor = (1.0 - cloud_cover / 200.0).max(0.3);
    round1(base * cloud_factor)
}

/// Reject readings that are out of range or look like an empty payload.
fn validate(main: &MainBlock) -> Result<f64, Error> {
    let temp = main
        .temp
        .ok_or_else(|| Error::OpenWeather("missing temperature".into()))?;

    if !(-50.0..=60.0).contains(&temp) {
        return Err(Error::OpenWeather(format!("invalid temperature: {}°C", temp)));
    }
    if temp == 0.0 && main.humidity.unwrap_or(0.0) == 0.0 {
        return Err(Error::OpenWeather(
            "suspicious reading (temp=0, no humidity)".into(),
        ));
    }
    Ok(temp)
}

/// Convert one `/weather` reply. `local_hour` drives the UV approximation.
pub fn normalize_current(
    commune: &Commune,
    resp: &CurrentResponse,
    local_hour: u32,
) -> Result<WeatherData, Error> {
    let temp = validate(&resp.main)?;
    let weather = resp.weather.first();
    let humidity = resp.main.humidity;

    Ok(WeatherData {
        lib_zone: commune.name.to_string(),
        code_zone: commune.code.to_string(),
        temperature: Some(round1(temp)),
        feels_like: Some(round1(resp.main.feels_like)),
        temp_min: Some(round1(resp.main.temp_min)),
        temp_max: Some(round1(resp.main.temp_max)),
        humidity,
        pressure: resp.main.pressure,
        wind_speed: Some(to_kmh(resp.wind.speed)),
        wind_deg: Some(resp.wind.deg.unwrap_or(0.0)),
        wind_gust: resp.wind.gust.filter(|g| *g != 0.0).map(to_kmh),
        weather_main: weather.map_or_else(|| "N/A".to_string(), |w| w.main.clone()),
        weather_description: weather
            .map_or_else(|| "Données non disponibles".to_string(), |w| w.description.clone()),
        weather_icon: weather.map_or_else(|| DEFAULT_ICON.to_string(), |w| w.icon.clone()),
        clouds: Some(resp.clouds.all),
        visibility: Some(resp.visibility.unwrap_or(10_000.0)),
        dew_point: humidity.map(|rh| round1(temp - (100.0 - rh) / 5.0)),
        sunrise: resp.sys.sunrise.and_then(format_unix_hhmm),
        sunset: resp.sys.sunset.and_then(format_unix_hhmm),
        timezone: Some(resp.timezone.unwrap_or(0)),
        rain_1h: resp.rain.one_hour,
        rain_3h: resp.rain.three_hours,
        uv_index: Some(approximate_uv(local_hour, resp.clouds.all)),
        weather_code: None,
        is_day: None,
    })
}
