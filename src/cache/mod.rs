//! Storefront query cache.
//!
//! Memoizes catalog reads behind a `CacheStore`. Every entry carries one or
//! more [`CacheTag`]s and a time-based expiry:
//!
//! - `QueryCache::cached` serves a live entry or runs the read and stores it
//! - `QueryCache::invalidate` drops all entries sharing a tag
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 30
//! max_entries = 1024
//! ```

mod config;
mod keys;
mod lock;
mod query;
mod registry;
mod store;

pub use config::CacheConfig;
pub use keys::{
    ANNOUNCEMENT_KEY, CATEGORY_CONFIG_KEY, CacheTag, PRODUCT_CATEGORIES_KEY, UnknownTag,
    VISITOR_COUNT_KEY, product_ratings_key, product_search_key,
};
pub use query::QueryCache;
pub use registry::TagRegistry;
pub use store::{CacheStore, MemoryStore};

pub(crate) use config::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECS};
