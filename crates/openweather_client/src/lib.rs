//! OpenWeatherMap client (legacy provider, requires an API key).

pub mod current;
pub mod forecast;

use chrono::Timelike;
use common::config::OpenWeatherConfig;
use common::dates::now_local;
use common::{Commune, Error, OwmForecastData, WeatherData, WeatherDataMap, COMMUNES};
use futures::future::join_all;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

pub use current::{approximate_uv, normalize_current, CurrentResponse};
pub use forecast::{normalize_forecast, unknown_commune, ForecastResponse};

/// OpenWeatherMap API client.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    config: OpenWeatherConfig,
}

impl OpenWeatherClient {
    pub fn new(config: OpenWeatherConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .map_err(|e| Error::OpenWeather(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn has_api_key(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        commune: &Commune,
        extra: &[(&str, &str)],
    ) -> Result<T, Error> {
        if !self.has_api_key() {
            return Err(Error::Config("OPENWEATHER_API_KEY non configurée".into()));
        }

        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint);
        debug!("Fetching OpenWeatherMap {} for {}", endpoint, commune.name);

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(&[
                ("lat", commune.lat.to_string()),
                ("lon", commune.lon.to_string()),
                ("appid", self.config.api_key.clone()),
                ("units", "metric".to_string()),
                ("lang", "fr".to_string()),
            ])
            .query(extra)
            .send()
            .await
            .map_err(|e| Error::OpenWeather(format!("HTTP error for {}: {}", commune.name, e)))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::OpenWeather(format!(
                "OpenWeatherMap returned {} for {}: {}",
                status,
                commune.name,
                body.chars().take(500).collect::<String>()
            )));
        }

        resp.json()
            .await
            .map_err(|e| Error::OpenWeather(format!("JSON parse error for {}: {}", commune.name, e)))
    }

    /// Current weather for one commune.
    pub async fn fetch_current(&self, commune: &Commune) -> Result<WeatherData, Error> {
        let resp: CurrentResponse = self.get_json("weather", commune, &[]).await?;
        normalize_current(commune, &resp, now_local().hour())
    }

    /// Current weather for every commune, all requests in flight at once.
    /// Communes that fail or fail validation get a placeholder entry.
    pub async fn fetch_all_current(&self) -> WeatherDataMap {
        info!("[Weather] Fetching OpenWeatherMap data for {} communes", COMMUNES.len());

        let results = join_all(COMMUNES.iter().map(|commune| self.fetch_current(commune))).await;

        let mut map = WeatherDataMap::new();
        for (commune, result) in COMMUNES.iter().zip(results) {
            let data = result.unwrap_or_else(|e| {
                warn!("[Weather] {} unavailable: {}", commune.name, e);
                WeatherData::unavailable(commune.code, commune.name, current::DEFAULT_ICON)
            });
            map.insert(commune.code.to_string(), data);
        }

        info!("[Weather] Data ready for {} communes", map.len());
        map
    }

    /// Five-day forecast for one commune.
    pub async fn fetch_forecast(&self, commune: &Commune) -> Result<OwmForecastData, Error> {
        let steps = forecast::FORECAST_STEPS.to_string();
        let resp: ForecastResponse = self
            .get_json("forecast", commune, &[("cnt", steps.as_str())])
            .await?;

        let data = normalize_forecast(commune, resp);
        info!(
            "[Forecast] {} days of OpenWeatherMap forecast for {}",
            data.daily.len(),
            commune.name
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::find_commune;

    #[tokio::test]
    async fn test_missing_key_is_a_config_error() {
        let client = OpenWeatherClient::new(OpenWeatherConfig::default()).unwrap();
        assert!(!client.has_api_key());

        let err = client
            .fetch_forecast(find_commune("97101").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_all_current_without_key_is_all_placeholders() {
        let client = OpenWeatherClient::new(OpenWeatherConfig::default()).unwrap();
        let map = client.fetch_all_current().await;

        assert_eq!(map.len(), COMMUNES.len());
        assert!(map.values().all(|w| w.weather_icon == "01d" && w.temperature.is_none()));
    }
}
