//! Cache storage.
//!
//! `CacheStore` is the seam between the query cache and whatever holds the
//! serialized entries; `MemoryStore` keeps them in process.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use metrics::counter;
use serde_json::Value;
use tokio::time::Instant;

use super::config::CacheConfig;
use super::lock::mutex_lock;
use super::registry::TagRegistry;

const SOURCE: &str = "cache::store";

pub(crate) const METRIC_CACHE_EVICT: &str = "storefront_cache_evict_total";
pub(crate) const METRIC_CACHE_INVALIDATED: &str = "storefront_cache_invalidated_total";

/// Key-value storage for serialized cache entries with tag invalidation.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live entry. Expired entries are reported as absent.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key` for `ttl`, labelled with `tags`.
    async fn put(&self, key: &str, tags: &[&str], ttl: Duration, value: Value);

    /// Drop every entry labelled with `tag`, returning how many were removed.
    async fn invalidate_tag(&self, tag: &str) -> usize;

    async fn invalidate_all(&self);

    async fn len(&self) -> usize;
}

struct StoredEntry {
    value: Value,
    expires_at: Instant,
}

/// In-process LRU store with per-entry expiry.
pub struct MemoryStore {
    entries: Mutex<LruCache<String, StoredEntry>>,
    registry: TagRegistry,
}

impl MemoryStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.max_entries_non_zero())),
            registry: TagRegistry::new(),
        }
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = mutex_lock(&self.entries, SOURCE, "get");
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
            self.registry.unregister(key);
        }
        None
    }

    async fn put(&self, key: &str, tags: &[&str], ttl: Duration, value: Value) {
        let entry = StoredEntry {
            value,
            expires_at: Instant::now() + ttl,
        };

        let mut entries = mutex_lock(&self.entries, SOURCE, "put");
        if let Some((evicted_key, _)) = entries.push(key.to_string(), entry) {
            if evicted_key != key {
                self.registry.unregister(&evicted_key);
                counter!(METRIC_CACHE_EVICT).increment(1);
            }
        }
        self.registry.register(key, tags);
    }

    async fn invalidate_tag(&self, tag: &str) -> usize {
        let mut entries = mutex_lock(&self.entries, SOURCE, "invalidate_tag");
        let keys = self.registry.unregister_tag(tag);

        let removed = keys
            .iter()
            .filter(|key| entries.pop(key.as_str()).is_some())
            .count();
        counter!(METRIC_CACHE_INVALIDATED).increment(removed as u64);
        removed
    }

    async fn invalidate_all(&self) {
        let mut entries = mutex_lock(&self.entries, SOURCE, "invalidate_all");
        let removed = entries.len();
        entries.clear();
        self.registry.clear();
        counter!(METRIC_CACHE_INVALIDATED).increment(removed as u64);
    }

    async fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }
}
