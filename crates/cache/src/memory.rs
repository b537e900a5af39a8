//! In-process store used when no external KV store is configured.
//!
//! Uses `DashMap` so concurrent handlers never contend on a single lock.

use async_trait::async_trait;
use chrono::Utc;
use common::Error;
use dashmap::DashMap;
use tracing::debug;

use crate::store::{CacheEntry, CacheStore};

#[derive(Debug, Clone)]
struct Slot {
    entry: CacheEntry,
    /// Epoch milliseconds after which the slot is dropped entirely.
    retain_until_ms: i64,
}

/// Process-local cache. Expired entries stay until their retention window
/// closes so they can back a stale fallback.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: DashMap<String, Slot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, Error> {
        let now_ms = Utc::now().timestamp_millis();

        let entry = match self.slots.get(key) {
            Some(slot) if now_ms < slot.retain_until_ms => Some(slot.entry.clone()),
            Some(_) => None,
            None => return Ok(None),
        };

        if entry.is_none() {
            // Guard dropped above; removing while holding it would deadlock.
            self.slots.remove(key);
            debug!("[Cache Local] Dropped \"{}\" past retention", key);
        }

        Ok(entry)
    }

    async fn set(&self, key: &str, entry: CacheEntry, retain_secs: u64) -> Result<(), Error> {
        let now_ms = Utc::now().timestamp_millis();
        let retain_ms = i64::try_from(retain_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        self.slots.insert(
            key.to_string(),
            Slot {
                entry,
                retain_until_ms: now_ms.saturating_add(retain_ms),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.slots.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        self.slots.clear();
        Ok(())
    }
}
