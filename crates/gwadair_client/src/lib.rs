//! Gwad'Air air-quality client.
//!
//! Queries the ArcGIS FeatureServer published by Gwad'Air and reshapes the
//! features into a map keyed by INSEE commune code.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, Utc};
use common::config::GwadAirConfig;
use common::dates::http_date_from_ms;
use common::{AirQualityData, AirQualityDataMap, Error};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

/// Gwad'Air API client.
#[derive(Debug, Clone)]
pub struct GwadAirClient {
    client: reqwest::Client,
    config: GwadAirConfig,
}

// ── ArcGIS response types ─────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ArcGisResponse {
    #[serde(default)]
    pub features: Vec<ArcGisFeature>,
}

#[derive(Debug, Deserialize)]
pub struct ArcGisFeature {
    #[serde(default)]
    pub attributes: serde_json::Map<String, Value>,
}

impl ArcGisFeature {
    fn code_zone(&self) -> Option<&str> {
        self.attributes
            .get("code_zone")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
    }

    fn date_ech_ms(&self) -> Option<i64> {
        self.attributes.get("date_ech").and_then(epoch_ms)
    }
}

/// ArcGIS dates are epoch milliseconds, occasionally serialized as floats.
fn epoch_ms(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().map(|ms| ms as i64))
}

/// Date window of one ArcGIS query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryWindow {
    /// `[day, day + 1]`, both ends inclusive.
    Today(NaiveDate),
    /// `[day - 1, day)`.
    DayBefore(NaiveDate),
}

impl QueryWindow {
    pub fn where_clause(&self) -> String {
        match *self {
            QueryWindow::Today(day) => format!(
                "date_ech >= '{}' AND date_ech <= '{}'",
                day,
                day + Duration::days(1)
            ),
            QueryWindow::DayBefore(day) => format!(
                "date_ech >= '{}' AND date_ech < '{}'",
                day - Duration::days(1),
                day
            ),
        }
    }
}

// ── Implementation ────────────────────────────────────────────────────

impl GwadAirClient {
    pub fn new(config: GwadAirConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .map_err(|e| Error::GwadAir(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Run one FeatureServer query.
    pub async fn query(&self, window: QueryWindow) -> Result<ArcGisResponse, Error> {
        let where_clause = window.where_clause();
        debug!("Fetching Gwad'Air features: {}", where_clause);

        let resp = self
            .client
            .get(&self.config.base_url)
            .header("Accept", "application/json")
            .query(&[
                ("where", where_clause.as_str()),
                ("outFields", "*"),
                ("returnGeometry", "false"),
                ("outSR", "4326"),
                ("f", "json"),
                ("orderByFields", "date_ech DESC"),
            ])
            .send()
            .await
            .map_err(|e| Error::GwadAir(format!("HTTP error: {}", e)))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::GwadAir(format!(
                "Gwad'Air returned {}: {}",
                status,
                body.chars().take(500).collect::<String>()
            )));
        }

        let data: ArcGisResponse = resp
            .json()
            .await
            .map_err(|e| Error::GwadAir(format!("JSON parse error: {}", e)))?;

        debug!("Got {} Gwad'Air features", data.features.len());
        Ok(data)
    }

    /// Today's indices for every commune, falling back to yesterday's when
    /// too few Guadeloupe communes have been published yet.
    pub async fn fetch_air_quality(&self) -> Result<AirQualityDataMap, Error> {
        let today = Utc::now().date_naive();
        let mut data = self.query(QueryWindow::Today(today)).await?;

        let found = count_guadeloupe(&data);
        if found < self.config.min_communes {
            info!(
                "[Gwad'Air] Only {} communes published today, using yesterday's data",
                found
            );
            data = self.query(QueryWindow::DayBefore(today)).await?;
        }

        let map = normalize_features(&data);
        info!("[Gwad'Air] Fetched {} communes", map.len());
        Ok(map)
    }
}

/// Features whose `code_zone` is a Guadeloupe commune (`971xx`).
pub fn count_guadeloupe(data: &ArcGisResponse) -> usize {
    data.features
        .iter()
        .filter(|f| f.code_zone().is_some_and(|c| c.starts_with("971")))
        .count()
}

/// Key features by commune, keeping the most recent `date_ech` per commune
/// and rendering `date_ech` / `date_dif` as HTTP dates.
pub fn normalize_features(data: &ArcGisResponse) -> AirQualityDataMap {
    let mut out = AirQualityDataMap::new();
    let mut dates: HashMap<String, Option<i64>> = HashMap::new();

    for feature in &data.features {
        let Some(code) = feature.code_zone() else {
            continue;
        };
        let date_ech = feature.date_ech_ms();

        if let Some(existing) = dates.get(code) {
            let newer = matches!((existing, date_ech), (Some(old), Some(new)) if new > *old);
            if !newer {
                continue;
            }
        }

        dates.insert(code.to_string(), date_ech);
        out.insert(code.to_string(), format_attributes(feature, code));
    }

    out
}

fn format_attributes(feature: &ArcGisFeature, code: &str) -> AirQualityData {
    let mut attrs = feature.attributes.clone();
    attrs.insert("code_zone".into(), Value::String(code.to_string()));

    for field in ["date_ech", "date_dif"] {
        let formatted = attrs
            .get(field)
            .and_then(epoch_ms)
            .filter(|ms| *ms != 0)
            .and_then(http_date_from_ms);
        match formatted {
            Some(date) => attrs.insert(field.into(), Value::String(date)),
            None => attrs.remove(field),
        };
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> ArcGisResponse {
        serde_json::from_value(value).unwrap()
    }

    // 2026-10-16T00:00:00Z and 2026-10-15T00:00:00Z
    const OCT_16: i64 = 1_792_108_800_000;
    const OCT_15: i64 = 1_792_022_400_000;

    #[test]
    fn test_where_clauses() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(
            QueryWindow::Today(day).where_clause(),
            "date_ech >= '2026-10-16' AND date_ech <= '2026-10-17'"
        );
        assert_eq!(
            QueryWindow::DayBefore(day).where_clause(),
            "date_ech >= '2026-10-15' AND date_ech < '2026-10-16'"
        );
    }

    #[test]
    fn test_normalize_formats_dates_and_passes_fields() {
        let data = response(json!({
            "features": [
                {"attributes": {
                    "code_zone": "97101",
                    "lib_zone": "Les Abymes",
                    "code_qual": 2,
                    "coul_qual": "#50CCAA",
                    "date_ech": OCT_16,
                    "date_dif": OCT_15
                }}
            ]
        }));

        let map = normalize_features(&data);
        let abymes = &map["97101"];
        assert_eq!(abymes["date_ech"], "Fri, 16 Oct 2026 00:00:00 GMT");
        assert_eq!(abymes["date_dif"], "Thu, 15 Oct 2026 00:00:00 GMT");
        assert_eq!(abymes["code_qual"], 2);
        assert_eq!(abymes["coul_qual"], "#50CCAA");
    }

    #[test]
    fn test_normalize_keeps_most_recent_per_commune() {
        let data = response(json!({
            "features": [
                {"attributes": {"code_zone": "97120", "code_qual": 1, "date_ech": OCT_15}},
                {"attributes": {"code_zone": "97120", "code_qual": 3, "date_ech": OCT_16}},
                {"attributes": {"code_zone": "97120", "code_qual": 5, "date_ech": OCT_15}}
            ]
        }));

        let map = normalize_features(&data);
        assert_eq!(map.len(), 1);
        assert_eq!(map["97120"]["code_qual"], 3);
    }

    #[test]
    fn test_normalize_skips_features_without_code() {
        let data = response(json!({
            "features": [
                {"attributes": {"lib_zone": "Inconnue"}},
                {"attributes": {"code_zone": "", "code_qual": 1}},
                {"attributes": {"code_zone": "97105", "code_qual": 2}}
            ]
        }));

        let map = normalize_features(&data);
        assert_eq!(map.len(), 1);
        assert!(map["97105"].get("date_ech").is_none());
    }

    #[test]
    fn test_count_guadeloupe() {
        let data = response(json!({
            "features": [
                {"attributes": {"code_zone": "97101"}},
                {"attributes": {"code_zone": "97801"}},
                {"attributes": {}}
            ]
        }));
        assert_eq!(count_guadeloupe(&data), 1);
        assert_eq!(count_guadeloupe(&ArcGisResponse::default()), 0);
    }
}
