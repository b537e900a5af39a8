//! `GET /api/water-cuts`

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cache::ttl;
use serde_json::json;
use tracing::error;

use super::{cache_control, cached_json};
use crate::state::AppState;

pub async fn get_water_cuts(State(state): State<AppState>) -> Response {
    match state.water_cuts.as_ref() {
        Ok(data) => cached_json(data, &cache_control(ttl::WATER_CUTS)),
        Err(message) => {
            error!("[API water-cuts] {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!(
                        "Impossible de récupérer les données des tours d'eau: {}",
                        message
                    )
                })),
            )
                .into_response()
        }
    }
}
