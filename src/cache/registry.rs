//! Bidirectional tag registry.
//!
//! Tracks the relationship between invalidation tags and cache keys,
//! enabling tag invalidation and cleanup when entries are evicted.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::registry";

/// Tracks tag → keys and key → tags mappings.
pub struct TagRegistry {
    tag_to_keys: RwLock<HashMap<String, HashSet<String>>>,
    key_to_tags: RwLock<HashMap<String, HashSet<String>>>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self {
            tag_to_keys: RwLock::new(HashMap::new()),
            key_to_tags: RwLock::new(HashMap::new()),
        }
    }

    /// Register a key under its tags, replacing any tags it carried before.
    pub fn register(&self, key: &str, tags: &[&str]) {
        self.unregister(key);

        let mut t2k = rw_write(&self.tag_to_keys, SOURCE, "register.tag_to_keys");
        let mut k2t = rw_write(&self.key_to_tags, SOURCE, "register.key_to_tags");

        let mut owned = HashSet::with_capacity(tags.len());
        for tag in tags {
            t2k.entry((*tag).to_string())
                .or_default()
                .insert(key.to_string());
            owned.insert((*tag).to_string());
        }
        k2t.insert(key.to_string(), owned);
    }

    /// All keys currently carrying `tag`.
    pub fn keys_for_tag(&self, tag: &str) -> HashSet<String> {
        rw_read(&self.tag_to_keys, SOURCE, "keys_for_tag")
            .get(tag)
            .cloned()
            .unwrap_or_default()
    }

    /// All tags carried by `key`.
    pub fn tags_for_key(&self, key: &str) -> HashSet<String> {
        rw_read(&self.key_to_tags, SOURCE, "tags_for_key")
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Remove a key and clean up its tag mappings.
    pub fn unregister(&self, key: &str) {
        let mut t2k = rw_write(&self.tag_to_keys, SOURCE, "unregister.tag_to_keys");
        let mut k2t = rw_write(&self.key_to_tags, SOURCE, "unregister.key_to_tags");

        if let Some(tags) = k2t.remove(key) {
            for tag in tags {
                if let Some(keys) = t2k.get_mut(&tag) {
                    keys.remove(key);
                    if keys.is_empty() {
                        t2k.remove(&tag);
                    }
                }
            }
        }
    }

    /// Remove a tag and every key carrying it, returning those keys.
    pub fn unregister_tag(&self, tag: &str) -> HashSet<String> {
        let mut t2k = rw_write(&self.tag_to_keys, SOURCE, "unregister_tag.tag_to_keys");
        let mut k2t = rw_write(&self.key_to_tags, SOURCE, "unregister_tag.key_to_tags");

        let affected = t2k.remove(tag).unwrap_or_default();

        for key in &affected {
            if let Some(tags) = k2t.remove(key) {
                for other in tags.iter().filter(|other| other.as_str() != tag) {
                    if let Some(keys) = t2k.get_mut(other) {
                        keys.remove(key);
                        if keys.is_empty() {
                            t2k.remove(other);
                        }
                    }
                }
            }
        }

        affected
    }

    pub fn clear(&self) {
        rw_write(&self.tag_to_keys, SOURCE, "clear.tag_to_keys").clear();
        rw_write(&self.key_to_tags, SOURCE, "clear.key_to_tags").clear();
    }

    pub fn tag_count(&self) -> usize {
        rw_read(&self.tag_to_keys, SOURCE, "tag_count").len()
    }

    pub fn key_count(&self) -> usize {
        rw_read(&self.key_to_tags, SOURCE, "key_count").len()
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}
