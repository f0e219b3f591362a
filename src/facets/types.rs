//! Allow-list types and error definitions.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::types::RepositoryError;
use crate::facets::hub_type::HubType;
use crate::facets::key::FacetKey;

/// Reference to a sample product inside a hub.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: u64,
    pub slug: String,
}

/// One facet combination and its population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowListEntry {
    pub key: FacetKey,
    pub count: u64,
    /// At most five references, lowest product id first.
    pub sample_refs: Vec<ProductRef>,
}

/// Where an allow-list snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSource {
    /// Computed from the repository during this call.
    Fresh,
    /// Current-schema cache entry.
    Cached,
    /// Legacy cache entry upgraded during this call.
    Migrated,
}

/// Facet index output for one hub type, ordered by count descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowListSnapshot {
    pub hub_type: HubType,
    pub entries: Vec<AllowListEntry>,
    /// Display labels keyed by `FacetKey::facet_string`.
    pub labels: BTreeMap<String, Vec<String>>,
    pub source: SnapshotSource,
    /// Unix seconds when the entries were computed.
    pub computed_at: u64,
}

impl AllowListSnapshot {
    /// Keys whose population reaches `min_count`.
    pub fn allowed(&self, min_count: u64) -> BTreeSet<FacetKey> {
        self.entries
            .iter()
            .filter(|e| e.count >= min_count)
            .map(|e| e.key.clone())
            .collect()
    }

    pub fn entry(&self, key: &FacetKey) -> Option<&AllowListEntry> {
        self.entries.iter().find(|e| e.key == *key)
    }

    /// Labels for `key`, falling back to its slugs.
    pub fn labels_for(&self, key: &FacetKey) -> Vec<String> {
        self.labels
            .get(&key.facet_string())
            .cloned()
            .unwrap_or_else(|| key.values().to_vec())
    }
}

/// Errors raised while building an allow-list or resolving a hub.
#[derive(Debug, Error)]
pub enum ComputationError {
    /// The product repository failed.
    #[error("repository failure: {0}")]
    Repository(#[from] RepositoryError),

    /// A key did not have the shape its hub type requires.
    #[error("invalid facet key: {0}")]
    InvalidKey(String),
}

/// Result type for allow-list computation.
pub type ComputationResult<T> = Result<T, ComputationError>;
