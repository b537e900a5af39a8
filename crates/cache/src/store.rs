//! Backing-store abstraction.

use async_trait::async_trait;
use common::Error;
use serde::{Deserialize, Serialize};

/// Envelope written to every backend.
///
/// Expiry is tracked here rather than by the store so that an expired entry
/// can still be read back as stale fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: serde_json::Value,
    /// Epoch milliseconds after which the entry is stale.
    pub expires_at_ms: i64,
}

impl CacheEntry {
    pub fn new(data: serde_json::Value, now_ms: i64, ttl_secs: u64) -> Self {
        let ttl_ms = i64::try_from(ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        Self {
            data,
            expires_at_ms: now_ms.saturating_add(ttl_ms),
        }
    }

    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms
    }
}

/// Single-key storage used by [`crate::CacheManager`].
///
/// `retain_secs` is how long the store must keep the entry, which is the TTL
/// plus the stale-retention window.
#[async_trait]
pub trait CacheStore: Send + Sync + std::fmt::Debug {
    /// Short backend label for logs.
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, Error>;

    async fn set(&self, key: &str, entry: CacheEntry, retain_secs: u64) -> Result<(), Error>;

    async fn delete(&self, key: &str) -> Result<(), Error>;

    /// Drop every entry. Shared stores may ignore this.
    async fn clear(&self) -> Result<(), Error>;
}
