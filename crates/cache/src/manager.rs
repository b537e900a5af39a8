//! Get-or-fetch front end over a [`CacheStore`].
//!
//! Store failures never fail a request: a read error is a miss and a write
//! error is logged and dropped.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use common::config::CacheConfig;
use common::Error;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::kv::KvStore;
use crate::memory::MemoryStore;
use crate::store::{CacheEntry, CacheStore};

/// Options for [`CacheManager::get_or_fetch`].
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub ttl_secs: u64,
    /// Serve expired data when the fetch fails.
    pub stale_while_revalidate: bool,
}

impl FetchOptions {
    pub fn ttl(ttl_secs: u64) -> Self {
        Self {
            ttl_secs,
            stale_while_revalidate: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheManager {
    store: Arc<dyn CacheStore>,
    stale_retention_secs: u64,
}

impl CacheManager {
    pub fn new(store: Arc<dyn CacheStore>, stale_retention_secs: u64) -> Self {
        Self {
            store,
            stale_retention_secs,
        }
    }

    /// KV store when both URL and token are configured, in-process otherwise.
    pub fn from_config(config: &CacheConfig) -> Result<Self, Error> {
        let store: Arc<dyn CacheStore> = if config.kv_configured() {
            Arc::new(KvStore::new(&config.kv_rest_api_url, &config.kv_rest_api_token)?)
        } else {
            Arc::new(MemoryStore::new())
        };
        info!("[Cache] Backend: {}", store.name());
        Ok(Self::new(store, config.stale_retention_secs))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), 86_400)
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.name()
    }

    pub fn is_kv_available(&self) -> bool {
        self.store.name() == "kv"
    }

    async fn read_entry(&self, key: &str) -> Option<CacheEntry> {
        match self.store.get(key).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("[Cache] Read error for \"{}\": {}", key, e);
                None
            }
        }
    }

    fn decode<T: DeserializeOwned>(key: &str, entry: CacheEntry) -> Option<T> {
        match serde_json::from_value(entry.data) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("[Cache] Undecodable entry for \"{}\": {}", key, e);
                None
            }
        }
    }

    /// Fresh value only.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.read_entry(key).await?;
        if !entry.is_fresh(Utc::now().timestamp_millis()) {
            return None;
        }
        Self::decode(key, entry)
    }

    /// Any retained value, fresh or expired.
    pub async fn get_stale<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.read_entry(key).await?;
        Self::decode(key, entry)
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        let data = match serde_json::to_value(value) {
            Ok(data) => data,
            Err(e) => {
                warn!("[Cache] Cannot encode \"{}\": {}", key, e);
                return;
            }
        };
        let entry = CacheEntry::new(data, Utc::now().timestamp_millis(), ttl_secs);
        let retain = ttl_secs.saturating_add(self.stale_retention_secs);

        match self.store.set(key, entry, retain).await {
            Ok(()) => debug!("[Cache] Stored \"{}\" (TTL {}s)", key, ttl_secs),
            Err(e) => warn!("[Cache] Write error for \"{}\": {}", key, e),
        }
    }

    /// Return the cached value for `key`, or run `fetch` and cache its result.
    ///
    /// When `fetch` fails and stale serving is enabled, the last retained
    /// value is returned instead of the error.
    pub async fn get_or_fetch<T, F, Fut>(
        &self,
        key: &str,
        fetch: F,
        opts: FetchOptions,
    ) -> Result<T, Error>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let now_ms = Utc::now().timestamp_millis();
        let retained = self.read_entry(key).await;

        if let Some(entry) = retained.as_ref().filter(|e| e.is_fresh(now_ms)) {
            if let Some(value) = Self::decode(key, entry.clone()) {
                info!("[Cache] Hit for \"{}\" ({})", key, self.backend_name());
                return Ok(value);
            }
        }

        info!("[Cache] Miss for \"{}\", fetching", key);
        match fetch().await {
            Ok(value) => {
                self.set(key, &value, opts.ttl_secs).await;
                Ok(value)
            }
            Err(e) => {
                if opts.stale_while_revalidate {
                    if let Some(value) = retained.and_then(|entry| Self::decode::<T>(key, entry)) {
                        warn!("[Cache] Fetch failed for \"{}\", serving stale data: {}", key, e);
                        return Ok(value);
                    }
                }
                Err(e)
            }
        }
    }

    pub async fn invalidate(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            warn!("[Cache] Delete error for \"{}\": {}", key, e);
        }
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("[Cache] Clear error: {}", e);
        }
    }
}
