//! Configuration loader: merges env vars, .env file, and config.toml.

use common::config::AppConfig;
use common::Error;
use std::path::Path;

fn parse_port(raw: &str) -> Result<u16, Error> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| Error::Config("PORT must be an integer in 1..=65535".into()))
}

fn parse_non_negative_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer >= 0")))
}

fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.server.host.trim().is_empty() {
        issues.push("server.host must not be empty".into());
    }
    if config.server.port == 0 {
        issues.push("server.port must be > 0".into());
    }

    let kv_url = config.cache.kv_rest_api_url.trim();
    let kv_token = config.cache.kv_rest_api_token.trim();
    if kv_url.is_empty() != kv_token.is_empty() {
        issues.push("KV_REST_API_URL and KV_REST_API_TOKEN must be set together".into());
    }
    if !kv_url.is_empty() && !kv_url.starts_with("http") {
        issues.push("KV_REST_API_URL must be an http(s) URL".into());
    }

    if config.gwadair.base_url.trim().is_empty() {
        issues.push("gwadair.base_url must not be empty".into());
    }
    if config.gwadair.min_communes == 0 {
        issues.push("gwadair.min_communes must be > 0".into());
    }

    if config.open_meteo.base_url.trim().is_empty() {
        issues.push("open_meteo.base_url must not be empty".into());
    }
    if config.open_meteo.batch_size == 0 {
        issues.push("open_meteo.batch_size must be > 0".into());
    }
    if config.open_meteo.initial_backoff_ms == 0 {
        issues.push("open_meteo.initial_backoff_ms must be > 0".into());
    }

    if config.openweather.base_url.trim().is_empty() {
        issues.push("openweather.base_url must not be empty".into());
    }

    let mf = &config.meteofrance;
    if mf.client_id.trim().is_empty() != mf.client_secret.trim().is_empty() {
        issues.push("METEOFRANCE_CLIENT_ID and METEOFRANCE_CLIENT_SECRET must be set together".into());
    }
    if mf.has_credentials() && mf.token_url.trim().is_empty() {
        issues.push("METEOFRANCE_TOKEN_URL is required when credentials are set".into());
    }
    if mf.guadeloupe_file.trim().is_empty() {
        issues.push("meteofrance.guadeloupe_file must not be empty".into());
    }
    if mf.domain_id.trim().is_empty() {
        issues.push("meteofrance.domain_id must not be empty".into());
    }

    if config.water_cuts_path.trim().is_empty() {
        issues.push("water_cuts_path must not be empty".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Apply environment overrides. `lookup` stands in for `std::env::var`.
fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), Error>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("PORT") {
        config.server.port = parse_port(&port)?;
    }
    if let Some(url) = lookup("KV_REST_API_URL") {
        config.cache.kv_rest_api_url = url;
    }
    if let Some(token) = lookup("KV_REST_API_TOKEN") {
        config.cache.kv_rest_api_token = token;
    }
    if let Some(raw) = lookup("CACHE_STALE_RETENTION_SECS") {
        config.cache.stale_retention_secs =
            parse_non_negative_u64(&raw, "CACHE_STALE_RETENTION_SECS")?;
    }
    if let Some(key) = lookup("OPENWEATHER_API_KEY") {
        config.openweather.api_key = key;
    }
    if let Some(id) = lookup("METEOFRANCE_CLIENT_ID") {
        config.meteofrance.client_id = id;
    }
    if let Some(secret) = lookup("METEOFRANCE_CLIENT_SECRET") {
        config.meteofrance.client_secret = secret;
    }
    if let Some(url) = lookup("METEOFRANCE_TOKEN_URL") {
        config.meteofrance.token_url = url;
    }
    if let Some(path) = lookup("WATER_CUTS_PATH") {
        config.water_cuts_path = path;
    }
    Ok(())
}

/// Load service configuration from environment and optional config file.
pub fn load_config() -> Result<AppConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}
