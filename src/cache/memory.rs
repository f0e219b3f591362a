//! In-process cache backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::cache::{Cache, CacheError};

#[derive(Debug, Clone)]
struct StoredValue {
    bytes: Vec<u8>,
    expires_at: Instant,
}

impl StoredValue {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// A thread-safe TTL map. Expired entries are dropped lazily on read.
#[derive(Clone, Default)]
pub struct MemoryCache {
    inner: Arc<DashMap<String, StoredValue>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner
            .get(key)
            .map(|v| v.is_live(Instant::now()))
            .unwrap_or(false)
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Instant::now();
        if let Some(value) = self.inner.get(key) {
            if value.is_live(now) {
                return Ok(Some(value.bytes.clone()));
            }
        }
        self.inner.remove_if(key, |_, v| !v.is_live(now));
        Ok(None)
    }

    fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.inner.insert(
            key.to_string(),
            StoredValue {
                bytes: value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let cache = MemoryCache::new();
        assert!(cache.get("k").unwrap().is_none());

        cache.set("k", b"v".to_vec(), Duration::from_secs(60)).unwrap();
        assert_eq!(cache.get("k").unwrap(), Some(b"v".to_vec()));
        assert!(cache.contains_key("k"));

        cache.delete("k").unwrap();
        assert!(cache.get("k").unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_are_dropped_on_read() {
        let cache = MemoryCache::new();
        cache.set("k", b"v".to_vec(), Duration::ZERO).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.get("k").unwrap().is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = MemoryCache::new();
        let other = cache.clone();
        cache.set("k", b"v".to_vec(), Duration::from_secs(60)).unwrap();
        assert!(other.contains_key("k"));
    }
}
