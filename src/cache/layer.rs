//! Cache layer in front of allow-list computation.
//!
//! # Responsibilities
//! - Read and write allow-list snapshots under version-tagged keys
//! - Upgrade legacy payloads on first read, then drop the legacy key
//! - Disable itself for the rest of its lifetime on the first backend failure
//!
//! # Design Decisions
//! - The disabled flag and the "already logged" flag belong to the instance,
//!   so two services in one process do not share failure state
//! - Undecodable current-schema payloads are deleted and treated as a miss

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::schema::{self, CacheEntryV1, CacheEntryV2, SchemaError};
use crate::cache::{Cache, CacheError};
use crate::facets::hub_type::HubType;
use crate::facets::types::{AllowListSnapshot, SnapshotSource};
use crate::observability::metrics;

/// Outcome of a cache read.
#[derive(Debug)]
pub enum CacheLookup {
    Hit(AllowListSnapshot),
    /// A legacy payload was found and upgraded during this read.
    Migrated(AllowListSnapshot),
    Miss,
}

pub struct CacheLayer {
    backend: Arc<dyn Cache>,
    ttl: Duration,
    disabled: AtomicBool,
    error_logged: AtomicBool,
}

impl CacheLayer {
    pub fn new(backend: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self {
            backend,
            ttl,
            disabled: AtomicBool::new(false),
            error_logged: AtomicBool::new(false),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// True once a backend failure has been seen.
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    pub fn lookup(&self, hub_type: HubType) -> CacheLookup {
        if self.is_disabled() {
            metrics::record_cache_result("disabled");
            return CacheLookup::Miss;
        }

        let current_key = schema::current_key(hub_type);
        match self.backend.get(&current_key) {
            Ok(Some(bytes)) => {
                match CacheEntryV2::decode(&bytes, hub_type)
                    .and_then(|entry| entry.into_snapshot(SnapshotSource::Cached))
                {
                    Ok(snapshot) => {
                        metrics::record_cache_result("hit");
                        return CacheLookup::Hit(snapshot);
                    }
                    Err(e) => {
                        tracing::debug!(hub_type = %hub_type, error = %e, "Discarding cached allow-list");
                        self.delete(&current_key);
                    }
                }
            }
            Ok(None) => {}
            Err(e) => {
                self.mark_unavailable(&e);
                return CacheLookup::Miss;
            }
        }

        let legacy_key = schema::legacy_key(hub_type);
        match self.backend.get(&legacy_key) {
            Ok(Some(bytes)) => match self.upgrade_legacy(hub_type, &bytes) {
                Ok(snapshot) => {
                    metrics::record_cache_result("migrated");
                    CacheLookup::Migrated(snapshot)
                }
                Err(e) => {
                    tracing::warn!(hub_type = %hub_type, error = %e, "Dropping unreadable legacy allow-list");
                    self.delete(&legacy_key);
                    metrics::record_cache_result("miss");
                    CacheLookup::Miss
                }
            },
            Ok(None) => {
                metrics::record_cache_result("miss");
                CacheLookup::Miss
            }
            Err(e) => {
                self.mark_unavailable(&e);
                CacheLookup::Miss
            }
        }
    }

    /// Write a snapshot under the current-schema key.
    pub fn store(&self, snapshot: &AllowListSnapshot) {
        if self.is_disabled() {
            return;
        }
        let bytes = match CacheEntryV2::from_snapshot(snapshot).encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(hub_type = %snapshot.hub_type, error = %e, "Failed to encode allow-list");
                return;
            }
        };
        if let Err(e) = self.backend.set(&schema::current_key(snapshot.hub_type), bytes, self.ttl) {
            self.mark_unavailable(&e);
        }
    }

    /// Drop every stored payload for a hub type.
    pub fn invalidate(&self, hub_type: HubType) {
        if self.is_disabled() {
            return;
        }
        self.delete(&schema::current_key(hub_type));
        self.delete(&schema::legacy_key(hub_type));
    }

    fn upgrade_legacy(&self, hub_type: HubType, bytes: &[u8]) -> Result<AllowListSnapshot, SchemaError> {
        let upgraded = schema::migrate(CacheEntryV1::decode(bytes)?, hub_type)?;
        let encoded = upgraded.encode()?;
        match self.backend.set(&schema::current_key(hub_type), encoded, self.ttl) {
            Ok(()) => self.delete(&schema::legacy_key(hub_type)),
            Err(e) => self.mark_unavailable(&e),
        }
        tracing::info!(hub_type = %hub_type, entries = upgraded.entries.len(), "Migrated legacy allow-list cache entry");
        upgraded.into_snapshot(SnapshotSource::Migrated)
    }

    fn delete(&self, key: &str) {
        if let Err(e) = self.backend.delete(key) {
            self.mark_unavailable(&e);
        }
    }

    fn mark_unavailable(&self, error: &CacheError) {
        self.disabled.store(true, Ordering::Relaxed);
        if !self.error_logged.swap(true, Ordering::Relaxed) {
            tracing::warn!(error = %error, "Cache backend unavailable, computing allow-lists directly from now on");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::facets::key::FacetKey;
    use crate::facets::types::AllowListEntry;
    use std::collections::BTreeMap;
    use std::sync::atomic::AtomicUsize;

    struct FailingCache {
        calls: AtomicUsize,
    }

    impl Cache for FailingCache {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CacheError::Unavailable("connection refused".into()))
        }

        fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CacheError::Unavailable("connection refused".into()))
        }

        fn delete(&self, _key: &str) -> Result<(), CacheError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CacheError::Unavailable("connection refused".into()))
        }
    }

    fn snapshot() -> AllowListSnapshot {
        AllowListSnapshot {
            hub_type: HubType::Engine,
            entries: vec![AllowListEntry {
                key: FacetKey::from_raw(HubType::Engine, &["WP13.550E501"]).unwrap(),
                count: 2,
                sample_refs: Vec::new(),
            }],
            labels: BTreeMap::new(),
            source: SnapshotSource::Fresh,
            computed_at: 1,
        }
    }

    #[test]
    fn test_store_then_hit() {
        let layer = CacheLayer::new(Arc::new(MemoryCache::new()), Duration::from_secs(300));
        assert!(matches!(layer.lookup(HubType::Engine), CacheLookup::Miss));

        layer.store(&snapshot());
        match layer.lookup(HubType::Engine) {
            CacheLookup::Hit(cached) => {
                assert_eq!(cached.entries, snapshot().entries);
                assert_eq!(cached.source, SnapshotSource::Cached);
            }
            other => panic!("expected hit, got {:?}", other),
        }

        layer.invalidate(HubType::Engine);
        assert!(matches!(layer.lookup(HubType::Engine), CacheLookup::Miss));
    }

    #[test]
    fn test_legacy_entry_is_migrated_once() {
        let backend = MemoryCache::new();
        backend
            .set(
                &schema::legacy_key(HubType::Engine),
                br#"{"entries": [["WP13.550E501", {"label": "WP13.550E501", "count": 2}]]}"#.to_vec(),
                Duration::from_secs(300),
            )
            .unwrap();
        let layer = CacheLayer::new(Arc::new(backend.clone()), Duration::from_secs(300));

        match layer.lookup(HubType::Engine) {
            CacheLookup::Migrated(migrated) => assert_eq!(migrated.entries, snapshot().entries),
            other => panic!("expected migration, got {:?}", other),
        }
        assert!(!backend.contains_key(&schema::legacy_key(HubType::Engine)));
        assert!(backend.contains_key(&schema::current_key(HubType::Engine)));
        assert!(matches!(layer.lookup(HubType::Engine), CacheLookup::Hit(_)));
    }

    #[test]
    fn test_garbage_payload_is_a_miss() {
        let backend = MemoryCache::new();
        backend
            .set(&schema::current_key(HubType::Engine), b"[1,2".to_vec(), Duration::from_secs(300))
            .unwrap();
        let layer = CacheLayer::new(Arc::new(backend.clone()), Duration::from_secs(300));
        assert!(matches!(layer.lookup(HubType::Engine), CacheLookup::Miss));
        assert!(backend.is_empty());
        assert!(!layer.is_disabled());
    }

    #[test]
    fn test_backend_failure_disables_layer() {
        let backend = Arc::new(FailingCache { calls: AtomicUsize::new(0) });
        let layer = CacheLayer::new(backend.clone(), Duration::from_secs(300));

        assert!(matches!(layer.lookup(HubType::Engine), CacheLookup::Miss));
        assert!(layer.is_disabled());
        let calls = backend.calls.load(Ordering::SeqCst);

        layer.store(&snapshot());
        layer.invalidate(HubType::Engine);
        assert!(matches!(layer.lookup(HubType::Line), CacheLookup::Miss));
        assert_eq!(backend.calls.load(Ordering::SeqCst), calls);
    }
}
