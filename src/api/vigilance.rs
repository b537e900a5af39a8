//! `GET /api/vigilance`
//!
//! Always answers 200: when the bulletin cannot be obtained the dashboard
//! gets a green default carrying an `error` message.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cache::{keys, ttl, FetchOptions};
use common::dates::now_ms;
use common::{Error, VigilanceData};
use tracing::{error, warn};

use super::{cache_control, cached_json};
use crate::state::AppState;

const MISSING_CREDENTIALS: &str = "Credentials Météo-France non configurés. \
Les données affichées sont des valeurs par défaut.";

/// Latest Guadeloupe bulletin, through the cache.
pub async fn load(state: &AppState) -> Result<VigilanceData, Error> {
    state
        .cache
        .get_or_fetch(
            keys::VIGILANCE,
            || state.meteofrance.fetch_vigilance(),
            FetchOptions::ttl(ttl::VIGILANCE),
        )
        .await
}

pub async fn get_vigilance(State(state): State<AppState>) -> Response {
    if !state.meteofrance.has_credentials() {
        warn!("[Vigilance] Météo-France credentials not configured, serving default level");
        return Json(VigilanceData::fallback(MISSING_CREDENTIALS, now_ms())).into_response();
    }

    match load(&state).await {
        Ok(data) => cached_json(data, &cache_control(ttl::VIGILANCE)),
        Err(e) => {
            error!("[API vigilance] {}", e);
            Json(VigilanceData::fallback(e.to_string(), now_ms())).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::api::test_support::{get, offline_state};
    use axum::http::StatusCode;
    use common::{AppConfig, VigilanceRisk};

    fn with_credentials() -> AppConfig {
        let mut config = AppConfig::default();
        config.meteofrance.client_id = "id".into();
        config.meteofrance.client_secret = "secret".into();
        config
    }

    #[tokio::test]
    async fn test_missing_credentials_serves_green_default() {
        let app = router(offline_state(AppConfig::default()));
        let (status, cache_control, body) = get(app, "/api/vigilance").await;

        assert_eq!(status, StatusCode::OK);
        assert!(cache_control.is_none());
        assert_eq!(body["level"], 1);
        assert_eq!(body["label"], "Vert");
        assert_eq!(body["error"], MISSING_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_upstream_failure_serves_green_with_error() {
        let app = router(offline_state(with_credentials()));
        let (status, _, body) = get(app, "/api/vigilance").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["department"], "971");
        assert_eq!(body["color"], "#28d761");
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_cached_bulletin_served() {
        let state = offline_state(with_credentials());
        let bulletin = VigilanceData::guadeloupe(
            3,
            vec![VigilanceRisk {
                kind: "Orages".into(),
                level: 3,
            }],
            7,
        );
        state.cache.set(keys::VIGILANCE, &bulletin, ttl::VIGILANCE).await;

        let (status, cache_control, body) = get(router(state), "/api/vigilance").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            cache_control.as_deref(),
            Some("public, s-maxage=300, stale-while-revalidate=600")
        );
        assert_eq!(body["label"], "Orange");
        assert_eq!(body["risks"][0]["type"], "Orages");
        assert!(body.get("error").is_none());
    }
}
