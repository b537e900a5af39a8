//! `GET /api/air-quality`

use axum::extract::State;
use axum::response::Response;
use cache::{keys, ttl, FetchOptions};
use common::{AirQualityDataMap, Error};

use super::cached_json;
use crate::errors::ApiError;
use crate::state::AppState;

/// Browsers keep air quality for two minutes.
const BROWSER_MAX_AGE: u64 = 120;

/// Gwad'Air readings for every commune, through the cache.
pub async fn load(state: &AppState) -> Result<AirQualityDataMap, Error> {
    state
        .cache
        .get_or_fetch(
            keys::AIR_QUALITY,
            || state.gwadair.fetch_air_quality(),
            FetchOptions::ttl(ttl::AIR_QUALITY),
        )
        .await
}

pub async fn get_air_quality(State(state): State<AppState>) -> Result<Response, ApiError> {
    let data = load(&state).await.map_err(|e| {
        ApiError::internal(format!(
            "Impossible de récupérer les données de qualité de l'air: {}",
            e
        ))
    })?;

    let header = format!(
        "public, s-maxage={}, stale-while-revalidate={}, max-age={}",
        ttl::AIR_QUALITY,
        ttl::AIR_QUALITY * 3,
        BROWSER_MAX_AGE
    );
    Ok(cached_json(data, &header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::api::test_support::{get, offline_state};
    use axum::http::StatusCode;
    use common::AppConfig;
    use serde_json::json;

    #[tokio::test]
    async fn test_serves_cached_data_with_headers() {
        let state = offline_state(AppConfig::default());
        let cached: AirQualityDataMap = serde_json::from_value(json!({
            "97101": {"code_zone": "97101", "code_qual": 2}
        }))
        .unwrap();
        state.cache.set(keys::AIR_QUALITY, &cached, ttl::AIR_QUALITY).await;

        let (status, cache_control, body) = get(router(state), "/api/air-quality").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            cache_control.as_deref(),
            Some("public, s-maxage=180, stale-while-revalidate=540, max-age=120")
        );
        assert_eq!(body["97101"]["code_qual"], 2);
    }

    #[tokio::test]
    async fn test_upstream_failure_serves_stale() {
        let state = offline_state(AppConfig::default());
        let stale: AirQualityDataMap = serde_json::from_value(json!({
            "97105": {"code_zone": "97105", "code_qual": 4}
        }))
        .unwrap();
        state.cache.set(keys::AIR_QUALITY, &stale, 0).await;

        let (status, _, body) = get(router(state), "/api/air-quality").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["97105"]["code_qual"], 4);
    }

    #[tokio::test]
    async fn test_upstream_failure_without_cache_is_500() {
        let state = offline_state(AppConfig::default());

        let (status, _, body) = get(router(state), "/api/air-quality").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Impossible de récupérer les données de qualité de l'air"));
        assert!(body["timestamp"].is_i64());
    }
}
