//! Open-Meteo routes: `GET /api/meteo/current` and `GET /api/meteo/forecast`.

use axum::extract::{Query, State};
use axum::response::Response;
use cache::{keys, ttl, FetchOptions};
use common::{find_commune, is_valid_code_zone, Error, ForecastData, ForecastDataMap, WeatherDataMap};
use serde::Deserialize;

use super::{
    cache_control, cached_json, require_some_current, require_some_forecast, INVALID_CODE_ZONE,
};
use crate::errors::ApiError;
use crate::state::AppState;

/// Current conditions for every commune, through the cache.
pub async fn load_current(state: &AppState) -> Result<WeatherDataMap, Error> {
    state
        .cache
        .get_or_fetch(
            keys::WEATHER,
            || async {
                require_some_current(state.open_meteo.fetch_all_current().await, Error::OpenMeteo)
            },
            FetchOptions::ttl(ttl::CURRENT_WEATHER),
        )
        .await
}

/// 3-day forecast for every commune, through the cache.
pub async fn load_all_forecasts(state: &AppState) -> Result<ForecastDataMap, Error> {
    state
        .cache
        .get_or_fetch(
            keys::FORECAST_ALL,
            || async { require_some_forecast(state.open_meteo.fetch_all_forecasts().await) },
            FetchOptions::ttl(ttl::FORECAST),
        )
        .await
}

pub async fn get_current(State(state): State<AppState>) -> Result<Response, ApiError> {
    let data = load_current(&state).await.map_err(|e| {
        ApiError::internal(format!("Impossible de récupérer les données météo: {}", e))
    })?;

    Ok(cached_json(data, &cache_control(ttl::CURRENT_WEATHER)))
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub code_zone: Option<String>,
}

pub async fn get_forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Response, ApiError> {
    let header = cache_control(ttl::FORECAST);
    let failed = |e: Error| ApiError::internal(format!("Impossible de récupérer les prévisions: {}", e));

    let code = query.code_zone.unwrap_or_default();
    if code.is_empty() {
        let data = load_all_forecasts(&state).await.map_err(failed)?;
        return Ok(cached_json(data, &header));
    }

    if !is_valid_code_zone(&code) {
        return Err(ApiError::bad_request(INVALID_CODE_ZONE));
    }
    let commune = find_commune(&code)
        .ok_or_else(|| ApiError::not_found(format!("Commune {} non trouvée", code)))?;

    let data: ForecastData = state
        .cache
        .get_or_fetch(
            &keys::forecast(&code),
            || state.open_meteo.fetch_forecast(commune),
            FetchOptions::ttl(ttl::FORECAST),
        )
        .await
        .map_err(failed)?;

    Ok(cached_json(data, &header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::api::test_support::{get, offline_state};
    use axum::http::StatusCode;
    use common::{AppConfig, WeatherData};
    use open_meteo_client::placeholder_forecast;

    #[tokio::test]
    async fn test_forecast_rejects_malformed_code() {
        let app = router(offline_state(AppConfig::default()));
        let (status, _, body) = get(app, "/api/meteo/forecast?code_zone=97A01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], INVALID_CODE_ZONE);
    }

    #[tokio::test]
    async fn test_forecast_unknown_commune() {
        let app = router(offline_state(AppConfig::default()));
        let (status, _, body) = get(app, "/api/meteo/forecast?code_zone=97199").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Commune 97199 non trouvée");
    }

    #[tokio::test]
    async fn test_forecast_single_commune_from_cache() {
        let state = offline_state(AppConfig::default());
        let commune = find_commune("97105").unwrap();
        let cached = placeholder_forecast(commune, 42);
        state
            .cache
            .set(&keys::forecast("97105"), &cached, ttl::FORECAST)
            .await;

        let (status, cache_control, body) =
            get(router(state), "/api/meteo/forecast?code_zone=97105").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            cache_control.as_deref(),
            Some("public, s-maxage=10800, stale-while-revalidate=21600")
        );
        assert_eq!(body["lib_zone"], "Basse-Terre");
        assert_eq!(body["last_updated"], 42);
    }

    #[tokio::test]
    async fn test_forecast_single_commune_upstream_down_is_500() {
        let app = router(offline_state(AppConfig::default()));
        let (status, _, body) = get(app, "/api/meteo/forecast?code_zone=97105").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_forecast_all_outage_without_cache_is_500() {
        let app = router(offline_state(AppConfig::default()));
        let (status, _, body) = get(app, "/api/meteo/forecast").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Impossible de récupérer les prévisions"));
    }

    #[tokio::test]
    async fn test_forecast_all_outage_keeps_stale_copy() {
        let state = offline_state(AppConfig::default());
        let commune = find_commune("97105").unwrap();
        let mut stale = ForecastDataMap::new();
        stale.insert("97105".into(), placeholder_forecast(commune, 42));
        state.cache.set(keys::FORECAST_ALL, &stale, 0).await;

        let (status, _, body) = get(router(state.clone()), "/api/meteo/forecast").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["97105"]["last_updated"], 42);
        assert!(body.get("97101").is_none());

        // The outage must not have been written back as fresh data.
        assert!(state
            .cache
            .get::<ForecastDataMap>(keys::FORECAST_ALL)
            .await
            .is_none());
        let retained: ForecastDataMap = state.cache.get_stale(keys::FORECAST_ALL).await.unwrap();
        assert_eq!(retained["97105"].last_updated, 42);
    }

    #[tokio::test]
    async fn test_current_falls_back_to_stale_when_every_commune_fails() {
        let state = offline_state(AppConfig::default());
        let mut stale = WeatherDataMap::new();
        let mut abymes = WeatherData::unavailable("97101", "Les Abymes", "HelpCircle");
        abymes.temperature = Some(29.5);
        stale.insert("97101".into(), abymes);
        state.cache.set(keys::WEATHER, &stale, 0).await;

        let (status, cache_control, body) = get(router(state), "/api/meteo/current").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            cache_control.as_deref(),
            Some("public, s-maxage=900, stale-while-revalidate=1800")
        );
        assert_eq!(body["97101"]["temperature"], 29.5);
    }
}
