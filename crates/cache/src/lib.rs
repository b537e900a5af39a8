//! Get-or-fetch cache for upstream API results.
//!
//! Entries live in a pluggable [`CacheStore`]: an external KV store reached
//! over REST when configured, an in-process map otherwise. Each entry carries
//! its own expiry so expired data can still be served when an upstream fails.

pub mod keys;
pub mod kv;
pub mod manager;
pub mod memory;
pub mod store;
pub mod ttl;

pub use kv::KvStore;
pub use manager::{CacheManager, FetchOptions};
pub use memory::MemoryStore;
pub use store::{CacheEntry, CacheStore};
