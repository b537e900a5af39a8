//! `/forecast` endpoint: five days in three-hour steps.

use std::collections::BTreeMap;

use chrono::DateTime;
use common::dates::guadeloupe_offset;
use common::{round1, Commune, DailySummary, OwmCity, OwmForecastData, OwmHourlyForecast};
use serde::Deserialize;

use crate::current::{to_kmh, CloudsBlock, WeatherBlock, DEFAULT_ICON};

/// Steps requested: 5 days × 8 three-hour slots.
pub const FORECAST_STEPS: u32 = 40;

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastItem>,
    pub city: Option<OwmCity>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    pub main: ItemMain,
    #[serde(default)]
    pub weather: Vec<WeatherBlock>,
    #[serde(default)]
    pub clouds: CloudsBlock,
    #[serde(default)]
    pub wind: ItemWind,
    pub pop: Option<f64>,
    #[serde(default)]
    pub rain: ItemRain,
}

#[derive(Debug, Deserialize)]
pub struct ItemMain {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub temp_min: f64,
    #[serde(default)]
    pub temp_max: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub pressure: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemWind {
    #[serde(default)]
    pub speed: f64,
    pub deg: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemRain {
    #[serde(rename = "3h")]
    pub three_hours: Option<f64>,
}

fn hourly_row(item: &ForecastItem) -> OwmHourlyForecast {
    let weather = item.weather.first();
    let time = DateTime::from_timestamp(item.dt, 0)
        .map(|dt| dt.with_timezone(&guadeloupe_offset()).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".into());

    OwmHourlyForecast {
        time,
        timestamp: item.dt,
        temperature: round1(item.main.temp),
        feels_like: round1(item.main.feels_like),
        temp_min: round1(item.main.temp_min),
        temp_max: round1(item.main.temp_max),
        humidity: item.main.humidity,
        pressure: item.main.pressure,
        weather_main: weather.map_or_else(|| "N/A".to_string(), |w| w.main.clone()),
        weather_description: weather
            .map_or_else(|| "Données non disponibles".to_string(), |w| w.description.clone()),
        weather_icon: weather.map_or_else(|| DEFAULT_ICON.to_string(), |w| w.icon.clone()),
        clouds: item.clouds.all,
        wind_speed: to_kmh(item.wind.speed),
        wind_deg: item.wind.deg.unwrap_or(0.0),
        pop: (item.pop.unwrap_or(0.0) * 100.0).round(),
        rain_3h: item.rain.three_hours.unwrap_or(0.0),
    }
}

fn summarize_day(date: String, hourly: Vec<OwmHourlyForecast>) -> DailySummary {
    let temp_min = hourly.iter().map(|h| h.temperature).fold(f64::INFINITY, f64::min);
    let temp_max = hourly
        .iter()
        .map(|h| h.temperature)
        .fold(f64::NEG_INFINITY, f64::max);

    // The middle slot stands in for the whole day.
    let middle = hourly.get(hourly.len() / 2);

    DailySummary {
        date,
        temp_min: round1(temp_min),
        temp_max: round1(temp_max),
        main_weather: middle.map_or_else(|| "N/A".to_string(), |h| h.weather_main.clone()),
        main_weather_description: middle
            .map(|h| h.weather_description.clone())
            .unwrap_or_default(),
        main_weather_icon: middle.map_or_else(|| DEFAULT_ICON.to_string(), |h| h.weather_icon.clone()),
        hourly,
    }
}

/// Group forecast steps by UTC date and summarise each day.
pub fn normalize_forecast(commune: &Commune, resp: ForecastResponse) -> OwmForecastData {
    let mut by_day: BTreeMap<String, Vec<OwmHourlyForecast>> = BTreeMap::new();

    for item in &resp.list {
        let Some(dt) = DateTime::from_timestamp(item.dt, 0) else {
            continue;
        };
        by_day
            .entry(dt.format("%Y-%m-%d").to_string())
            .or_default()
            .push(hourly_row(item));
    }

    let daily = by_day
        .into_iter()
        .map(|(date, hourly)| (date.clone(), summarize_day(date, hourly)))
        .collect();

    OwmForecastData {
        code_zone: commune.code.to_string(),
        lib_zone: commune.name.to_string(),
        daily,
        city: resp.city,
        error: None,
    }
}

/// Body served for a well-formed code that is not a known commune.
pub fn unknown_commune(code_zone: &str) -> OwmForecastData {
    OwmForecastData {
        code_zone: code_zone.to_string(),
        lib_zone: "Commune inconnue".into(),
        daily: BTreeMap::new(),
        city: None,
        error: Some(format!("Commune {} non trouvée", code_zone)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::find_commune;
    use serde_json::json;

    // 2026-10-16T00:00:00Z
    const DAY: i64 = 1_792_108_800;

    fn item(dt: i64, temp: f64, main: &str, pop: f64) -> serde_json::Value {
        json!({
            "dt": dt,
            "main": {"temp": temp, "feels_like": temp + 2.0, "temp_min": temp, "temp_max": temp,
                     "humidity": 70, "pressure": 1013},
            "weather": [{"main": main, "description": main.to_lowercase(), "icon": "10d"}],
            "clouds": {"all": 40},
            "wind": {"speed": 4.0, "deg": 90},
            "pop": pop
        })
    }

    fn sample() -> ForecastResponse {
        serde_json::from_value(json!({
            "list": [
                item(DAY + 12 * 3600, 29.0, "Clouds", 0.1),
                item(DAY + 15 * 3600, 30.24, "Rain", 0.456),
                item(DAY + 18 * 3600, 28.0, "Clear", 0.0),
                item(DAY + 27 * 3600, 26.5, "Clear", 0.0)
            ],
            "city": {"name": "Pointe-à-Pitre", "coord": {"lat": 16.24, "lon": -61.53},
                     "country": "GP", "timezone": -14400}
        }))
        .unwrap()
    }

    #[test]
    fn test_groups_by_utc_date() {
        let commune = find_commune("97120").unwrap();
        let data = normalize_forecast(commune, sample());

        assert_eq!(data.daily.len(), 2);
        let first = &data.daily["2026-10-16"];
        assert_eq!(first.hourly.len(), 3);
        assert_eq!(first.temp_min, 28.0);
        assert_eq!(first.temp_max, 30.2);
        assert_eq!(first.main_weather, "Rain");
        assert_eq!(first.main_weather_description, "rain");

        let second = &data.daily["2026-10-17"];
        assert_eq!(second.hourly.len(), 1);
        assert_eq!(second.main_weather, "Clear");
        assert_eq!(data.city.as_ref().unwrap().country, "GP");
    }

    #[test]
    fn test_hourly_conversions() {
        let commune = find_commune("97120").unwrap();
        let data = normalize_forecast(commune, sample());
        let slot = &data.daily["2026-10-16"].hourly[1];

        assert_eq!(slot.pop, 46.0);
        assert_eq!(slot.wind_speed, 14.4);
        assert_eq!(slot.rain_3h, 0.0);
        // 15:00Z → 11:00 local
        assert_eq!(slot.time, "11:00");
    }

    #[test]
    fn test_unknown_commune_body() {
        let data = unknown_commune("97999");
        assert_eq!(data.lib_zone, "Commune inconnue");
        assert!(data.daily.is_empty());
        assert_eq!(data.error.as_deref(), Some("Commune 97999 non trouvée"));
    }
}
