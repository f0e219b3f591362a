//! Allow-list resolution.
//!
//! # Responsibilities
//! - Serve per-hub-type snapshots, from cache when possible
//! - Filter snapshots to the keys meeting a population threshold
//! - Gate child hub types on their parent's allow-list (category/engine pairs
//!   need an allowed engine)
//! - Invalidate cached snapshots when inventory changes
//!
//! # Design Decisions
//! - Concurrent misses may recompute the same snapshot; the result is a pure
//!   function of repository state, so the last write wins harmlessly
//! - Without a cache layer every call recomputes

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::cache::{CacheLayer, CacheLookup};
use crate::config::ThresholdConfig;
use crate::facets::hub_type::HubType;
use crate::facets::index::FacetIndex;
use crate::facets::key::FacetKey;
use crate::facets::types::{AllowListSnapshot, ComputationResult};
use crate::observability::metrics;

#[derive(Clone)]
pub struct AllowListResolver {
    index: FacetIndex,
    cache: Option<Arc<CacheLayer>>,
    thresholds: ThresholdConfig,
}

impl AllowListResolver {
    pub fn new(index: FacetIndex, cache: Option<Arc<CacheLayer>>, thresholds: ThresholdConfig) -> Self {
        Self {
            index,
            cache,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub fn cache(&self) -> Option<&CacheLayer> {
        self.cache.as_deref()
    }

    /// Snapshot for `hub_type`: cached, migrated or freshly computed.
    pub fn snapshot(&self, hub_type: HubType) -> ComputationResult<AllowListSnapshot> {
        if let Some(cache) = &self.cache {
            match cache.lookup(hub_type) {
                CacheLookup::Hit(snapshot) | CacheLookup::Migrated(snapshot) => return Ok(snapshot),
                CacheLookup::Miss => {}
            }
        }
        self.fresh_snapshot(hub_type)
    }

    /// Recompute from the repository, bypassing cache reads, and store the result.
    pub fn fresh_snapshot(&self, hub_type: HubType) -> ComputationResult<AllowListSnapshot> {
        metrics::record_allow_list_computation(hub_type);
        let snapshot = self.index.snapshot(hub_type, &self.thresholds)?;
        tracing::debug!(hub_type = %hub_type, entries = snapshot.entries.len(), "Computed allow-list");
        if let Some(cache) = &self.cache {
            cache.store(&snapshot);
        }
        Ok(snapshot)
    }

    /// Keys of `hub_type` whose population is at least `min_count` and whose
    /// parent, if the type has one, is allowed too.
    pub fn allowed(&self, hub_type: HubType, min_count: u64) -> ComputationResult<BTreeSet<FacetKey>> {
        let mut keys = self.snapshot(hub_type)?.allowed(min_count);
        if let Some(parent) = hub_type.parent() {
            let parents = self.snapshot(parent)?.allowed(parent.min_count());
            keys.retain(|k| k.parent_key().is_some_and(|p| parents.contains(&p)));
        }
        Ok(keys)
    }

    /// Whether the parent allow-list admits `key`; true for types without a parent.
    pub fn parent_admits(&self, key: &FacetKey) -> ComputationResult<bool> {
        let Some(parent_key) = key.parent_key() else {
            return Ok(true);
        };
        let parent = parent_key.hub_type();
        Ok(self
            .snapshot(parent)?
            .entry(&parent_key)
            .is_some_and(|e| e.count >= parent.min_count()))
    }

    pub fn invalidate(&self, hub_type: HubType) {
        if let Some(cache) = &self.cache {
            cache.invalidate(hub_type);
        }
    }

    pub fn invalidate_all(&self) {
        for hub_type in HubType::all() {
            self.invalidate(hub_type);
        }
    }
}
