//! HTTP routes served to the dashboard.

pub mod air_quality;
pub mod meteo;
pub mod vigilance;
pub mod water_cuts;
pub mod weather;

use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::collections::BTreeMap;

use common::{Error, ForecastDataMap, WeatherDataMap};
use serde::Serialize;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/api/air-quality", get(air_quality::get_air_quality))
        .route("/api/meteo/current", get(meteo::get_current))
        .route("/api/meteo/forecast", get(meteo::get_forecast))
        .route("/api/weather", get(weather::get_weather))
        .route("/api/forecast/:code_zone", get(weather::get_forecast))
        .route("/api/vigilance", get(vigilance::get_vigilance))
        .route("/api/water-cuts", get(water_cuts::get_water_cuts))
        .with_state(state)
}

async fn root_handler() -> &'static str {
    "Gwad'Alerte API"
}

/// CDN caching for `ttl` seconds, then stale for twice as long.
pub fn cache_control(ttl_secs: u64) -> String {
    format!(
        "public, s-maxage={}, stale-while-revalidate={}",
        ttl_secs,
        ttl_secs * 2
    )
}

/// JSON body with a `Cache-Control` header.
pub fn cached_json<T: Serialize>(body: T, cache_control: &str) -> Response {
    let mut response = Json(body).into_response();
    if let Ok(value) = HeaderValue::from_str(cache_control) {
        response.headers_mut().insert(CACHE_CONTROL, value);
    }
    response
}

pub const INVALID_CODE_ZONE: &str = "Code zone invalide (format attendu: 5 chiffres)";

/// Bulk fetchers replace failed communes with placeholders, so a total
/// outage still looks like a map. Treat a map without a single real entry as
/// a failed fetch: the cache then serves its stale copy instead of storing
/// the placeholders.
fn require_any<T>(
    map: BTreeMap<String, T>,
    has_data: impl Fn(&T) -> bool,
    to_error: fn(String) -> Error,
) -> Result<BTreeMap<String, T>, Error> {
    if map.values().any(has_data) {
        Ok(map)
    } else {
        Err(to_error("no commune returned data".into()))
    }
}

pub fn require_some_current(
    map: WeatherDataMap,
    to_error: fn(String) -> Error,
) -> Result<WeatherDataMap, Error> {
    require_any(map, |w| w.temperature.is_some(), to_error)
}

pub fn require_some_forecast(map: ForecastDataMap) -> Result<ForecastDataMap, Error> {
    require_any(map, |f| !f.daily.is_empty(), Error::OpenMeteo)
}
