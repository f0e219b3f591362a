//! Versioned allow-list cache payloads.
//!
//! # Versions
//! - v1 (legacy, key `allow_list:{hub_type}`): entries as ordered
//!   `[facet_string, {label, count}]` pairs, labels joined with ` / `
//! - v2 (current, key `allow_list:{hub_type}:v2`): entry list plus a separate
//!   label map, tagged with its version, hub type and store time
//!
//! `migrate` is the only place that understands v1.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::facets::hub_type::HubType;
use crate::facets::index::unix_now;
use crate::facets::key::FacetKey;
use crate::facets::types::{AllowListEntry, AllowListSnapshot, ProductRef, SnapshotSource};

pub const SCHEMA_VERSION: u32 = 2;

const LEGACY_LABEL_SEPARATOR: &str = " / ";

/// Errors raised while decoding a cached payload.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("undecodable payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unsupported schema version {found}, expected {}", SCHEMA_VERSION)]
    Version { found: u32 },

    #[error("payload is for hub type {found}, expected {expected}")]
    HubType { found: HubType, expected: HubType },

    #[error("payload holds an invalid key: {0}")]
    InvalidKey(String),
}

/// Key of the current-schema entry for a hub type.
pub fn current_key(hub_type: HubType) -> String {
    format!("allow_list:{}:v{}", hub_type.name(), SCHEMA_VERSION)
}

/// Key the legacy schema was stored under.
pub fn legacy_key(hub_type: HubType) -> String {
    format!("allow_list:{}", hub_type.name())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub values: Vec<String>,
    pub count: u64,
    #[serde(default)]
    pub sample_refs: Vec<ProductRef>,
}

/// Current cache payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntryV2 {
    pub version: u32,
    pub hub_type: HubType,
    pub entries: Vec<StoredEntry>,
    pub labels: BTreeMap<String, Vec<String>>,
    pub stored_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyValue {
    pub label: String,
    pub count: u64,
}

/// Legacy cache payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntryV1 {
    pub entries: Vec<(String, LegacyValue)>,
}

impl CacheEntryV2 {
    pub fn from_snapshot(snapshot: &AllowListSnapshot) -> Self {
        Self {
            version: SCHEMA_VERSION,
            hub_type: snapshot.hub_type,
            entries: snapshot
                .entries
                .iter()
                .map(|e| StoredEntry {
                    values: e.key.values().to_vec(),
                    count: e.count,
                    sample_refs: e.sample_refs.clone(),
                })
                .collect(),
            labels: snapshot.labels.clone(),
            stored_at: snapshot.computed_at,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, SchemaError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode and check a current-schema payload for `expected`.
    pub fn decode(bytes: &[u8], expected: HubType) -> Result<Self, SchemaError> {
        let entry: Self = serde_json::from_slice(bytes)?;
        if entry.version != SCHEMA_VERSION {
            return Err(SchemaError::Version { found: entry.version });
        }
        if entry.hub_type != expected {
            return Err(SchemaError::HubType {
                found: entry.hub_type,
                expected,
            });
        }
        Ok(entry)
    }

    /// Rebuild a snapshot, re-validating every key.
    pub fn into_snapshot(self, source: SnapshotSource) -> Result<AllowListSnapshot, SchemaError> {
        let hub_type = self.hub_type;
        let mut entries = self
            .entries
            .into_iter()
            .map(|stored| {
                let key = FacetKey::new(hub_type, stored.values)
                    .map_err(|e| SchemaError::InvalidKey(e.to_string()))?;
                Ok(AllowListEntry {
                    key,
                    count: stored.count,
                    sample_refs: stored.sample_refs,
                })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        Ok(AllowListSnapshot {
            hub_type,
            entries,
            labels: self.labels,
            source,
            computed_at: self.stored_at,
        })
    }
}

impl CacheEntryV1 {
    pub fn decode(bytes: &[u8]) -> Result<Self, SchemaError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Upgrade a legacy payload. Idempotent: the result is a plain v2 payload.
///
/// Legacy payloads carried no sample references; migrated entries have none
/// until the next recomputation.
pub fn migrate(legacy: CacheEntryV1, hub_type: HubType) -> Result<CacheEntryV2, SchemaError> {
    let mut entries = Vec::with_capacity(legacy.entries.len());
    let mut labels = BTreeMap::new();
    for (facet_string, value) in legacy.entries {
        let key = FacetKey::from_facet_string(hub_type, &facet_string)
            .map_err(|e| SchemaError::InvalidKey(e.to_string()))?;
        let label: Vec<String> = value
            .label
            .split(LEGACY_LABEL_SEPARATOR)
            .map(|s| s.trim().to_string())
            .collect();
        if label.len() == key.values().len() {
            labels.insert(key.facet_string(), label);
        }
        entries.push(StoredEntry {
            values: key.values().to_vec(),
            count: value.count,
            sample_refs: Vec::new(),
        });
    }
    Ok(CacheEntryV2 {
        version: SCHEMA_VERSION,
        hub_type,
        entries,
        labels,
        stored_at: unix_now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = r#"{"entries": [
        ["X3000:Tractors", {"label": "X3000 / Tractors", "count": 3}],
        ["x5000:dump-trucks", {"label": "X5000", "count": 1}]
    ]}"#;

    #[test]
    fn test_keys_carry_version() {
        assert_eq!(current_key(HubType::LineCategory), "allow_list:line_category:v2");
        assert_eq!(legacy_key(HubType::LineCategory), "allow_list:line_category");
    }

    #[test]
    fn test_migrate_normalizes_keys_and_splits_labels() {
        let legacy = CacheEntryV1::decode(LEGACY.as_bytes()).unwrap();
        let v2 = migrate(legacy, HubType::LineCategory).unwrap();
        assert_eq!(v2.version, SCHEMA_VERSION);
        assert_eq!(v2.entries[0].values, vec!["x3000", "tractors"]);
        assert_eq!(v2.entries[0].count, 3);
        assert_eq!(
            v2.labels.get("x3000:tractors"),
            Some(&vec!["X3000".to_string(), "Tractors".to_string()])
        );
        // Label arity mismatch falls back to slugs.
        assert!(v2.labels.get("x5000:dump-trucks").is_none());
    }

    #[test]
    fn test_migrate_is_idempotent_through_v2() {
        let legacy = CacheEntryV1::decode(LEGACY.as_bytes()).unwrap();
        let v2 = migrate(legacy, HubType::LineCategory).unwrap();
        let bytes = v2.encode().unwrap();
        let again = CacheEntryV2::decode(&bytes, HubType::LineCategory).unwrap();
        assert_eq!(again, v2);
    }

    #[test]
    fn test_decode_rejects_other_versions_and_types() {
        let legacy = CacheEntryV1::decode(LEGACY.as_bytes()).unwrap();
        let mut v2 = migrate(legacy, HubType::LineCategory).unwrap();
        let bytes = v2.encode().unwrap();
        assert!(matches!(
            CacheEntryV2::decode(&bytes, HubType::Engine),
            Err(SchemaError::HubType { .. })
        ));

        v2.version = 3;
        let bytes = v2.encode().unwrap();
        assert!(matches!(
            CacheEntryV2::decode(&bytes, HubType::LineCategory),
            Err(SchemaError::Version { found: 3 })
        ));

        assert!(CacheEntryV2::decode(LEGACY.as_bytes(), HubType::LineCategory).is_err());
    }

    #[test]
    fn test_migrate_rejects_malformed_keys() {
        let legacy = CacheEntryV1::decode(br#"{"entries": [["only-one", {"label": "x", "count": 2}]]}"#).unwrap();
        assert!(matches!(
            migrate(legacy, HubType::LineCategory),
            Err(SchemaError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_into_snapshot_restores_order() {
        let v2 = CacheEntryV2 {
            version: SCHEMA_VERSION,
            hub_type: HubType::Engine,
            entries: vec![
                StoredEntry { values: vec!["b1".into()], count: 2, sample_refs: Vec::new() },
                StoredEntry { values: vec!["a1".into()], count: 2, sample_refs: Vec::new() },
                StoredEntry { values: vec!["c1".into()], count: 7, sample_refs: Vec::new() },
            ],
            labels: BTreeMap::new(),
            stored_at: 10,
        };
        let snapshot = v2.into_snapshot(SnapshotSource::Cached).unwrap();
        let order: Vec<_> = snapshot.entries.iter().map(|e| e.key.facet_string()).collect();
        assert_eq!(order, vec!["c1", "a1", "b1"]);
        assert_eq!(snapshot.source, SnapshotSource::Cached);
        assert_eq!(snapshot.computed_at, 10);
    }
}
