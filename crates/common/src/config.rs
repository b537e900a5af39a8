//! Service configuration types.

use serde::{Deserialize, Serialize};

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Cache backend and retention settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Gwad'Air ArcGIS endpoint.
    #[serde(default)]
    pub gwadair: GwadAirConfig,

    /// Open-Meteo endpoint and pacing.
    #[serde(default)]
    pub open_meteo: OpenMeteoConfig,

    /// OpenWeatherMap endpoint and key.
    #[serde(default)]
    pub openweather: OpenWeatherConfig,

    /// Météo-France vigilance credentials and endpoints.
    #[serde(default)]
    pub meteofrance: MeteoFranceConfig,

    /// Path to the static water-cut schedule.
    #[serde(default = "default_water_cuts_path")]
    pub water_cuts_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// REST endpoint of the external KV store. Empty means in-process cache.
    #[serde(default)]
    pub kv_rest_api_url: String,

    /// Bearer token for the KV store.
    #[serde(default)]
    pub kv_rest_api_token: String,

    /// How long entries are kept past their TTL to serve as stale fallback.
    #[serde(default = "default_stale_retention")]
    pub stale_retention_secs: u64,
}

impl CacheConfig {
    /// KV is used only when both URL and token are set.
    pub fn kv_configured(&self) -> bool {
        !self.kv_rest_api_url.trim().is_empty() && !self.kv_rest_api_token.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GwadAirConfig {
    #[serde(default = "default_gwadair_url")]
    pub base_url: String,

    /// Below this many Guadeloupe communes for today, fall back to yesterday.
    #[serde(default = "default_min_communes")]
    pub min_communes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenMeteoConfig {
    #[serde(default = "default_open_meteo_url")]
    pub base_url: String,

    /// Concurrent requests per batch when fetching every commune.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between batches (milliseconds).
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Retries on HTTP 429.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay (milliseconds), doubled on each retry.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWeatherConfig {
    #[serde(default = "default_openweather_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeteoFranceConfig {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_vigilance_url")]
    pub vigilance_url: String,

    /// Entry of the vigilance archive holding the Guadeloupe bulletin.
    #[serde(default = "default_guadeloupe_file")]
    pub guadeloupe_file: String,

    #[serde(default = "default_domain_id")]
    pub domain_id: String,
}

impl MeteoFranceConfig {
    pub fn has_credentials(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8000
}
fn default_stale_retention() -> u64 {
    86_400
}
fn default_water_cuts_path() -> String {
    "data/tours-deau.json".into()
}
fn default_gwadair_url() -> String {
    "https://services8.arcgis.com/7RrxpwWeFIQ8JGGp/arcgis/rest/services/ind_guadeloupe_1/FeatureServer/0/query".into()
}
fn default_min_communes() -> usize {
    5
}
fn default_open_meteo_url() -> String {
    "https://api.open-meteo.com/v1/forecast".into()
}
fn default_batch_size() -> usize {
    5
}
fn default_batch_delay_ms() -> u64 {
    500
}
fn default_max_retries() -> u32 {
    3
}
fn default_initial_backoff_ms() -> u64 {
    1000
}
fn default_openweather_url() -> String {
    "https://api.openweathermap.org/data/2.5".into()
}
fn default_token_url() -> String {
    "https://portail-api.meteofrance.fr/token".into()
}
fn default_vigilance_url() -> String {
    "https://public-api.meteofrance.fr/public/DPVigilance/v1/vigilanceom/flux/dernier".into()
}
fn default_guadeloupe_file() -> String {
    "CDPV85_TFFR_.txt".into()
}
fn default_domain_id() -> String {
    "VIGI971".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            kv_rest_api_url: String::new(),
            kv_rest_api_token: String::new(),
            stale_retention_secs: default_stale_retention(),
        }
    }
}

impl Default for GwadAirConfig {
    fn default() -> Self {
        Self {
            base_url: default_gwadair_url(),
            min_communes: default_min_communes(),
        }
    }
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            base_url: default_open_meteo_url(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_openweather_url(),
            api_key: String::new(),
        }
    }
}

impl Default for MeteoFranceConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_url: default_token_url(),
            vigilance_url: default_vigilance_url(),
            guadeloupe_file: default_guadeloupe_file(),
            domain_id: default_domain_id(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            gwadair: GwadAirConfig::default(),
            open_meteo: OpenMeteoConfig::default(),
            openweather: OpenWeatherConfig::default(),
            meteofrance: MeteoFranceConfig::default(),
            water_cuts_path: default_water_cuts_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{"server": {"port": 9000}}"#).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.open_meteo.batch_size, 5);
        assert_eq!(cfg.meteofrance.domain_id, "VIGI971");
    }

    #[test]
    fn test_kv_requires_url_and_token() {
        let mut cache = CacheConfig::default();
        assert!(!cache.kv_configured());
        cache.kv_rest_api_url = "https://kv.example.com".into();
        assert!(!cache.kv_configured());
        cache.kv_rest_api_token = "secret".into();
        assert!(cache.kv_configured());
    }
}
