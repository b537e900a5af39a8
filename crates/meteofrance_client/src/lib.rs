//! Météo-France overseas vigilance client.
//!
//! Authenticates with OAuth2 client credentials, downloads the latest
//! overseas vigilance archive and reads the Guadeloupe bulletin out of it.

pub mod bulletin;

use std::time::Duration;

use common::config::MeteoFranceConfig;
use common::dates::now_ms;
use common::{Error, VigilanceData};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub use bulletin::{extract_bulletin, parse_vigilance};

/// Tokens are renewed this long before they expire.
const TOKEN_REFRESH_MARGIN_MS: i64 = 5 * 60 * 1000;

const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    /// Epoch milliseconds.
    expires_at_ms: i64,
}

impl CachedToken {
    fn usable_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms.saturating_sub(TOKEN_REFRESH_MARGIN_MS)
    }
}

/// One-line summary of a bulletin, e.g. `Level 3 (Orange), 1 risks`.
pub fn describe(data: &VigilanceData) -> String {
    format!(
        "Level {} ({}), {} risks",
        data.level,
        data.label,
        data.risks.len()
    )
}

/// Expiry instant for a token issued at `now_ms` with `lifetime_secs` to live.
fn token_expiry_ms(now_ms: i64, lifetime_secs: i64) -> i64 {
    now_ms.saturating_add(lifetime_secs.saturating_mul(1000))
}

/// Météo-France API client. Holds the bearer token for the life of the process.
#[derive(Debug)]
pub struct MeteoFranceClient {
    client: reqwest::Client,
    config: MeteoFranceConfig,
    token: Mutex<Option<CachedToken>>,
}

impl MeteoFranceClient {
    pub fn new(config: MeteoFranceConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::MeteoFrance(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.config.has_credentials()
    }

    /// Current access token, requesting a new one when the cached token is
    /// missing or about to expire.
    async fn access_token(&self) -> Result<String, Error> {
        let mut cached = self.token.lock().await;
        let now = now_ms();

        if let Some(token) = cached.as_ref().filter(|t| t.usable_at(now)) {
            debug!("[Météo-France] Reusing cached token");
            return Ok(token.token.clone());
        }

        if !self.has_credentials() {
            return Err(Error::Config("Credentials Météo-France non configurés".into()));
        }
        if self.config.token_url.trim().is_empty() {
            return Err(Error::Config("METEOFRANCE_TOKEN_URL non configurée".into()));
        }

        debug!("[Météo-France] Requesting new token");
        let resp = self
            .client
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| Error::MeteoFrance(format!("token HTTP error: {}", e)))?;

        let status = resp.status().as_u16();
        if status != 200 {
            return Err(Error::MeteoFrance(format!(
                "authentication failed: HTTP {}",
                status
            )));
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| Error::MeteoFrance(format!("token parse error: {}", e)))?;

        let lifetime = body.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        info!("[Météo-France] New token, expires in {}s", lifetime);

        let token = body.access_token;
        *cached = Some(CachedToken {
            token: token.clone(),
            expires_at_ms: token_expiry_ms(now, lifetime),
        });
        Ok(token)
    }

    /// Download the vigilance archive and return the Guadeloupe bulletin.
    pub async fn fetch_vigilance(&self) -> Result<VigilanceData, Error> {
        info!("[Vigilance] Calling Météo-France");
        let token = self.access_token().await?;

        let resp = self
            .client
            .get(&self.config.vigilance_url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| Error::MeteoFrance(format!("HTTP error: {}", e)))?;

        let status = resp.status().as_u16();
        if status != 200 {
            return Err(Error::MeteoFrance(format!("vigilance API returned HTTP {}", status)));
        }

        let archive = resp
            .bytes()
            .await
            .map_err(|e| Error::MeteoFrance(format!("archive download failed: {}", e)))?;

        let raw = extract_bulletin(&archive, &self.config.guadeloupe_file)?;
        let data = parse_vigilance(&raw, &self.config.domain_id, now_ms())?;

        info!("[Vigilance] {}", describe(&data));
        Ok(data)
    }
}
