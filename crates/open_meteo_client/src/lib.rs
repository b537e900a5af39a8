//! Open-Meteo client (no API key).
//!
//! Fetches current conditions and three-day forecasts per commune. Bulk
//! fetches run in small concurrent batches with a pause in between, and
//! HTTP 429 replies are retried with exponential backoff.

pub mod current;
pub mod forecast;

use std::future::Future;
use std::time::Duration;

use common::config::OpenMeteoConfig;
use common::dates::{now_local, now_ms, GUADELOUPE_TZ};
use common::{Commune, Error, ForecastData, ForecastDataMap, WeatherData, WeatherDataMap, COMMUNES};
use futures::future::join_all;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub use current::{normalize_current, CurrentResponse};
pub use forecast::{normalize_forecast, placeholder_forecast, ForecastResponse};

/// Open-Meteo API client.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
    config: OpenMeteoConfig,
}

/// Delay before retry number `attempt` (0-based): `initial * 2^attempt`.
pub fn backoff_delay(initial_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(initial_ms.saturating_mul(1u64 << attempt.min(16)))
}

impl OpenMeteoClient {
    pub fn new(config: OpenMeteoConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| Error::OpenMeteo(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// GET the forecast endpoint for one commune, retrying on HTTP 429.
    async fn get_json<T: DeserializeOwned>(
        &self,
        commune: &Commune,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let mut attempt = 0u32;
        loop {
            debug!("Fetching Open-Meteo data for {}", commune.name);

            let resp = self
                .client
                .get(&self.config.base_url)
                .header("Accept", "application/json")
                .query(&[
                    ("latitude", commune.lat.to_string()),
                    ("longitude", commune.lon.to_string()),
                    ("timezone", GUADELOUPE_TZ.to_string()),
                ])
                .query(params)
                .send()
                .await
                .map_err(|e| Error::OpenMeteo(format!("HTTP error for {}: {}", commune.name, e)))?;

            let status = resp.status().as_u16();
            if status == 429 {
                if attempt < self.config.max_retries {
                    let delay = backoff_delay(self.config.initial_backoff_ms, attempt);
                    attempt += 1;
                    warn!(
                        "[Meteo] Rate limited for {}, retry {}/{} in {}ms",
                        commune.name,
                        attempt,
                        self.config.max_retries,
                        delay.as_millis()
                    );
                    sleep(delay).await;
                    continue;
                }
                return Err(Error::RateLimited {
                    attempts: attempt + 1,
                });
            }

            if status != 200 {
                let body = resp.text().await.unwrap_or_default();
                return Err(Error::OpenMeteo(format!(
                    "Open-Meteo returned {} for {}: {}",
                    status,
                    commune.name,
                    body.chars().take(500).collect::<String>()
                )));
            }

            return resp.json().await.map_err(|e| {
                Error::OpenMeteo(format!("JSON parse error for {}: {}", commune.name, e))
            });
        }
    }

    /// Current conditions for one commune.
    pub async fn fetch_current(&self, commune: &Commune) -> Result<WeatherData, Error> {
        let resp: CurrentResponse = self
            .get_json(
                commune,
                &[
                    ("current", current::CURRENT_PARAMS.to_string()),
                    ("daily", current::CURRENT_DAILY_PARAMS.to_string()),
                    ("forecast_days", "1".to_string()),
                ],
            )
            .await?;

        normalize_current(commune, &resp)
    }

    /// Three-day forecast for one commune.
    pub async fn fetch_forecast(&self, commune: &Commune) -> Result<ForecastData, Error> {
        let resp: ForecastResponse = self
            .get_json(
                commune,
                &[
                    ("hourly", forecast::HOURLY_PARAMS.to_string()),
                    ("daily", forecast::DAILY_PARAMS.to_string()),
                    ("forecast_days", forecast::FORECAST_DAYS.to_string()),
                ],
            )
            .await?;

        Ok(normalize_forecast(
            commune,
            &resp,
            now_local().date_naive(),
            now_ms(),
        ))
    }

    /// Run `fetch` over `communes` in batches of `batch_size`, pausing
    /// `batch_delay_ms` between batches.
    async fn in_batches<'a, T, F, Fut>(&self, communes: &'a [Commune], fetch: F) -> Vec<(&'a Commune, T)>
    where
        F: Fn(&'a Commune) -> Fut,
        Fut: Future<Output = T>,
    {
        let batch_size = self.config.batch_size.max(1);
        let batch_count = communes.len().div_ceil(batch_size);
        let mut out = Vec::with_capacity(communes.len());

        for (index, batch) in communes.chunks(batch_size).enumerate() {
            let results = join_all(batch.iter().map(&fetch)).await;
            out.extend(batch.iter().zip(results));

            if index + 1 < batch_count {
                sleep(Duration::from_millis(self.config.batch_delay_ms)).await;
            }
        }

        out
    }

    /// Current conditions for every commune. Failed communes get a
    /// placeholder entry rather than failing the whole map.
    pub async fn fetch_all_current(&self) -> WeatherDataMap {
        info!("[Meteo] Fetching current weather for {} communes", COMMUNES.len());

        let results = self
            .in_batches(&COMMUNES, |commune| self.fetch_current(commune))
            .await;

        let mut map = WeatherDataMap::new();
        let mut failed = 0usize;
        for (commune, result) in results {
            let data = result.unwrap_or_else(|e| {
                warn!("[Meteo] {} unavailable: {}", commune.name, e);
                failed += 1;
                WeatherData::unavailable(commune.code, commune.name, "HelpCircle")
            });
            map.insert(commune.code.to_string(), data);
        }

        info!(
            "[Meteo] Current weather ready: {} communes, {} unavailable",
            map.len(),
            failed
        );
        map
    }

    /// Forecasts for every commune. Failed communes get an empty forecast.
    pub async fn fetch_all_forecasts(&self) -> ForecastDataMap {
        info!("[Forecast] Fetching forecasts for {} communes", COMMUNES.len());

        let results = self
            .in_batches(&COMMUNES, |commune| self.fetch_forecast(commune))
            .await;

        let mut map = ForecastDataMap::new();
        for (commune, result) in results {
            let data = result.unwrap_or_else(|e| {
                warn!("[Forecast] {} unavailable: {}", commune.name, e);
                placeholder_forecast(commune, now_ms())
            });
            map.insert(commune.code.to_string(), data);
        }

        info!("[Forecast] Forecasts ready for {} communes", map.len());
        map
    }
}
