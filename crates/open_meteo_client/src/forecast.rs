//! Three-day hourly + daily forecast.

use chrono::{NaiveDate, Timelike};
use common::dates::{
    day_name_fr, format_date_fr, format_hhmm, format_hour, local_to_epoch_secs,
    parse_local_datetime, GUADELOUPE_TZ,
};
use common::weather_codes::{short_label, weather_description, weather_icon};
use common::{round1, Commune, DailyForecast, ForecastData, HourlyForecast};
use serde::Deserialize;

pub const HOURLY_PARAMS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
precipitation_probability,precipitation,weather_code,wind_speed_10m,wind_direction_10m,\
cloud_cover,is_day";

pub const DAILY_PARAMS: &str = "weather_code,temperature_2m_max,temperature_2m_min,\
apparent_temperature_max,apparent_temperature_min,sunrise,sunset,precipitation_sum,\
precipitation_probability_max,wind_speed_10m_max,wind_gusts_10m_max,\
wind_direction_10m_dominant,uv_index_max";

pub const FORECAST_DAYS: u32 = 3;

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub hourly: HourlyBlock,
    #[serde(default)]
    pub daily: DailyBlock,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HourlyBlock {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub relative_humidity_2m: Vec<Option<f64>>,
    pub apparent_temperature: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
    pub wind_speed_10m: Vec<Option<f64>>,
    pub wind_direction_10m: Vec<Option<f64>>,
    pub cloud_cover: Vec<Option<f64>>,
    pub is_day: Vec<Option<u8>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DailyBlock {
    pub time: Vec<String>,
    pub weather_code: Vec<Option<i32>>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub apparent_temperature_max: Vec<Option<f64>>,
    pub apparent_temperature_min: Vec<Option<f64>>,
    pub sunrise: Vec<String>,
    pub sunset: Vec<String>,
    pub precipitation_sum: Vec<Option<f64>>,
    pub precipitation_probability_max: Vec<Option<f64>>,
    pub wind_speed_10m_max: Vec<Option<f64>>,
    pub wind_gusts_10m_max: Vec<Option<f64>>,
    pub wind_direction_10m_dominant: Vec<Option<f64>>,
    pub uv_index_max: Vec<Option<f64>>,
}

/// Value at `i`, with nulls and short arrays read as zero.
fn at(values: &[Option<f64>], i: usize) -> f64 {
    values.get(i).copied().flatten().unwrap_or(0.0)
}

fn code_at(values: &[Option<i32>], i: usize) -> Option<i32> {
    values.get(i).copied().flatten()
}

fn str_at(values: &[String], i: usize) -> &str {
    values.get(i).map(String::as_str).unwrap_or_default()
}

fn hourly_row(h: &HourlyBlock, i: usize) -> HourlyForecast {
    let time = str_at(&h.time, i);
    let local = parse_local_datetime(time);
    let hour = local.map(|t| t.hour()).unwrap_or(12);
    let is_day = h.is_day.get(i).copied().flatten() == Some(1);
    let code = code_at(&h.weather_code, i);

    HourlyForecast {
        time: time.to_string(),
        hour: format_hour(time),
        timestamp: local.map(local_to_epoch_secs).unwrap_or_default(),
        temperature: round1(at(&h.temperature_2m, i)),
        feels_like: round1(at(&h.apparent_temperature, i)),
        humidity: at(&h.relative_humidity_2m, i),
        precipitation: at(&h.precipitation, i),
        precipitation_probability: at(&h.precipitation_probability, i),
        weather_code: code.unwrap_or_default(),
        weather_main: short_label(code),
        weather_description: weather_description(code, Some(is_day), Some(hour)),
        weather_icon: weather_icon(code, hour).to_string(),
        wind_speed: round1(at(&h.wind_speed_10m, i)),
        wind_deg: at(&h.wind_direction_10m, i),
        clouds: at(&h.cloud_cover, i),
        is_day,
    }
}

/// Group the hourly rows under each forecast day.
///
/// `today` decides which day is labelled "Aujourd'hui"; `now_ms` stamps
/// `last_updated`.
pub fn normalize_forecast(
    commune: &Commune,
    resp: &ForecastResponse,
    today: NaiveDate,
    now_ms: i64,
) -> ForecastData {
    let d = &resp.daily;
    let mut daily = Vec::with_capacity(d.time.len());

    for (day_index, date) in d.time.iter().enumerate() {
        let code = code_at(&d.weather_code, day_index);

        let hourly = resp
            .hourly
            .time
            .iter()
            .enumerate()
            .filter(|(_, t)| t.starts_with(date.as_str()))
            .map(|(i, _)| hourly_row(&resp.hourly, i))
            .collect();

        daily.push(DailyForecast {
            date: date.clone(),
            date_formatted: format_date_fr(date),
            day_name: day_name_fr(date, day_index, today),
            temp_min: round1(at(&d.temperature_2m_min, day_index)),
            temp_max: round1(at(&d.temperature_2m_max, day_index)),
            feels_like_min: round1(at(&d.apparent_temperature_min, day_index)),
            feels_like_max: round1(at(&d.apparent_temperature_max, day_index)),
            weather_code: code.unwrap_or_default(),
            weather_main: short_label(code),
            weather_description: weather_description(code, Some(true), None),
            // Daily summaries always use the midday icon.
            weather_icon: weather_icon(code, 12).to_string(),
            precipitation_sum: round1(at(&d.precipitation_sum, day_index)),
            precipitation_probability: at(&d.precipitation_probability_max, day_index),
            wind_speed_max: round1(at(&d.wind_speed_10m_max, day_index)),
            wind_gusts_max: round1(at(&d.wind_gusts_10m_max, day_index)),
            wind_direction: at(&d.wind_direction_10m_dominant, day_index),
            uv_index: round1(at(&d.uv_index_max, day_index)),
            sunrise: format_hhmm(str_at(&d.sunrise, day_index)),
            sunset: format_hhmm(str_at(&d.sunset, day_index)),
            hourly,
        });
    }

    ForecastData {
        code_zone: commune.code.to_string(),
        lib_zone: commune.name.to_string(),
        latitude: resp.latitude,
        longitude: resp.longitude,
        timezone: if resp.timezone.is_empty() {
            GUADELOUPE_TZ.to_string()
        } else {
            resp.timezone.clone()
        },
        daily,
        last_updated: now_ms,
    }
}

/// Empty forecast served for a commune whose fetch failed.
pub fn placeholder_forecast(commune: &Commune, now_ms: i64) -> ForecastData {
    ForecastData {
        code_zone: commune.code.to_string(),
        lib_zone: commune.name.to_string(),
        latitude: commune.lat,
        longitude: commune.lon,
        timezone: GUADELOUPE_TZ.to_string(),
        daily: Vec::new(),
        last_updated: now_ms,
    }
}
