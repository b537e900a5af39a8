//! OpenWeatherMap routes: `GET /api/weather` and `GET /api/forecast/{code_zone}`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cache::{keys, ttl, FetchOptions};
use common::{find_commune, is_valid_code_zone, Error, OwmForecastData, WeatherDataMap};
use openweather_client::unknown_commune;

use super::{cache_control, cached_json, require_some_current, INVALID_CODE_ZONE};
use crate::errors::ApiError;
use crate::state::AppState;

const MISSING_KEY: &str = "OPENWEATHER_API_KEY non configurée";

/// OpenWeatherMap current conditions for every commune, through the cache.
pub async fn load_current(state: &AppState) -> Result<WeatherDataMap, Error> {
    state
        .cache
        .get_or_fetch(
            keys::WEATHER_OWM,
            || async {
                require_some_current(
                    state.openweather.fetch_all_current().await,
                    Error::OpenWeather,
                )
            },
            FetchOptions::ttl(ttl::WEATHER),
        )
        .await
}

pub async fn get_weather(State(state): State<AppState>) -> Result<Response, ApiError> {
    if !state.openweather.has_api_key() {
        return Err(ApiError::internal(MISSING_KEY));
    }

    let data = load_current(&state).await.map_err(|e| {
        ApiError::internal(format!("Impossible de récupérer les données météo: {}", e))
    })?;

    Ok(cached_json(data, &cache_control(ttl::WEATHER)))
}

pub async fn get_forecast(
    State(state): State<AppState>,
    Path(code_zone): Path<String>,
) -> Result<Response, ApiError> {
    if !is_valid_code_zone(&code_zone) {
        return Err(ApiError::bad_request(INVALID_CODE_ZONE));
    }

    let Some(commune) = find_commune(&code_zone) else {
        return Ok((StatusCode::NOT_FOUND, Json(unknown_commune(&code_zone))).into_response());
    };

    if !state.openweather.has_api_key() {
        return Err(ApiError::internal(MISSING_KEY));
    }

    let data: OwmForecastData = state
        .cache
        .get_or_fetch(
            &keys::forecast_owm(&code_zone),
            || state.openweather.fetch_forecast(commune),
            FetchOptions::ttl(ttl::FORECAST),
        )
        .await
        .map_err(|e| {
            ApiError::internal(format!("Impossible de récupérer les prévisions: {}", e))
        })?;

    Ok(cached_json(data, &cache_control(ttl::FORECAST)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::api::test_support::{get, offline_state};
    use common::{AppConfig, WeatherData};

    fn with_key() -> AppConfig {
        let mut config = AppConfig::default();
        config.openweather.api_key = "test-key".into();
        config
    }

    #[tokio::test]
    async fn test_weather_requires_api_key() {
        let app = router(offline_state(AppConfig::default()));
        let (status, _, body) = get(app, "/api/weather").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], MISSING_KEY);
    }

    #[tokio::test]
    async fn test_weather_outage_prefers_stale_copy() {
        let state = offline_state(with_key());
        let mut stale = WeatherDataMap::new();
        let mut gosier = WeatherData::unavailable("97113", "Le Gosier", "04d");
        gosier.temperature = Some(29.5);
        stale.insert("97113".into(), gosier);
        state.cache.set(keys::WEATHER_OWM, &stale, 0).await;

        let (status, cache_control, body) = get(router(state.clone()), "/api/weather").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            cache_control.as_deref(),
            Some("public, s-maxage=900, stale-while-revalidate=1800")
        );
        assert_eq!(body["97113"]["temperature"], 29.5);
        assert!(body.get("97101").is_none());

        // Placeholders from the outage were not cached over the good copy.
        assert!(state
            .cache
            .get::<WeatherDataMap>(keys::WEATHER_OWM)
            .await
            .is_none());
        let retained: WeatherDataMap = state.cache.get_stale(keys::WEATHER_OWM).await.unwrap();
        assert_eq!(retained["97113"].temperature, Some(29.5));
    }

    #[tokio::test]
    async fn test_weather_outage_without_cache_is_500() {
        let app = router(offline_state(with_key()));
        let (status, _, body) = get(app, "/api/weather").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Impossible de récupérer les données météo"));
    }

    #[tokio::test]
    async fn test_forecast_malformed_code() {
        let app = router(offline_state(with_key()));
        let (status, _, _) = get(app, "/api/forecast/123").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_forecast_unknown_commune_body() {
        let app = router(offline_state(AppConfig::default()));
        let (status, _, body) = get(app, "/api/forecast/97199").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["lib_zone"], "Commune inconnue");
        assert_eq!(body["code_zone"], "97199");
        assert!(body["daily"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_forecast_requires_api_key_for_known_commune() {
        let app = router(offline_state(AppConfig::default()));
        let (status, _, _) = get(app, "/api/forecast/97101").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_forecast_upstream_down_is_500() {
        let app = router(offline_state(with_key()));
        let (status, _, body) = get(app, "/api/forecast/97101").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Impossible de récupérer les prévisions"));
    }
}
