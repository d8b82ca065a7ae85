//! Memoized reads on top of a `CacheStore`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::config::CacheConfig;
use super::keys::CacheTag;
use super::store::{CacheStore, MemoryStore};

pub(crate) const METRIC_CACHE_HIT: &str = "storefront_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS: &str = "storefront_cache_miss_total";

/// Shared handle for cached reads and tag invalidation.
#[derive(Clone)]
pub struct QueryCache {
    store: Arc<dyn CacheStore>,
    enabled: bool,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(config: &CacheConfig, store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            enabled: config.enabled,
            ttl: config.ttl(),
        }
    }

    /// A cache backed by a fresh in-process `MemoryStore`.
    pub fn in_memory(config: &CacheConfig) -> Self {
        Self::new(config, Arc::new(MemoryStore::new(config)))
    }

    /// The configured expiry for cached reads.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the value cached under `key`, or run `producer` and cache its
    /// successful result for `ttl` under `tags`. Errors are never cached.
    pub async fn cached<T, E, F, Fut>(
        &self,
        key: &str,
        tags: &[CacheTag],
        ttl: Duration,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.enabled {
            return producer().await;
        }

        if let Some(raw) = self.store.get(key).await {
            match serde_json::from_value::<T>(raw) {
                Ok(value) => {
                    counter!(METRIC_CACHE_HIT).increment(1);
                    debug!(target = "storefront::cache", key, "cache hit");
                    return Ok(value);
                }
                Err(err) => {
                    warn!(
                        target = "storefront::cache",
                        key,
                        error = %err,
                        "discarding undecodable cache entry"
                    );
                }
            }
        }

        counter!(METRIC_CACHE_MISS).increment(1);
        let value = producer().await?;

        match serde_json::to_value(&value) {
            Ok(raw) => {
                let tag_names: Vec<&str> = tags.iter().map(|tag| tag.as_str()).collect();
                self.store.put(key, &tag_names, ttl, raw).await;
            }
            Err(err) => {
                warn!(
                    target = "storefront::cache",
                    key,
                    error = %err,
                    "value could not be serialized; not cached"
                );
            }
        }

        Ok(value)
    }

    /// Drop every cached read labelled with `tag`.
    pub async fn invalidate(&self, tag: CacheTag) -> usize {
        let removed = self.store.invalidate_tag(tag.as_str()).await;
        debug!(
            target = "storefront::cache",
            tag = tag.as_str(),
            removed,
            "invalidated cache tag"
        );
        removed
    }

    pub async fn invalidate_all(&self) {
        self.store.invalidate_all().await;
    }

    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
