//! Facet aggregation.
//!
//! # Responsibilities
//! - Group live products by their normalized dimension values
//! - Count members, keep sample references and a display label per group
//! - Order groups deterministically and apply the cap
//!
//! # Design Decisions
//! - Ordering is count descending, then key ascending, so repeated runs over
//!   the same inventory produce byte-identical cache payloads
//! - The cap bounds output size regardless of inventory size
//! - The label is the most frequent raw value tuple (ties: smallest)

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::catalog::repository::ProductRepository;
use crate::config::ThresholdConfig;
use crate::facets::hub_type::HubType;
use crate::facets::key::FacetKey;
use crate::facets::normalize::Dimension;
use crate::facets::types::{
    AllowListEntry, AllowListSnapshot, ComputationError, ComputationResult, ProductRef,
    SnapshotSource,
};

/// Upper bound on sample references per group.
pub const MAX_SAMPLE_REFS: usize = 5;

/// One aggregated group, before it is bound to a hub type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetGroup {
    pub values: Vec<String>,
    pub count: u64,
    pub sample_refs: Vec<ProductRef>,
    pub label: Vec<String>,
}

#[derive(Default)]
struct GroupAccumulator {
    count: u64,
    refs: Vec<ProductRef>,
    raw_values: HashMap<Vec<String>, u64>,
}

/// Aggregates repository products into facet combination counts.
#[derive(Clone)]
pub struct FacetIndex {
    repository: Arc<dyn ProductRepository>,
    sample_refs: usize,
}

impl FacetIndex {
    pub fn new(repository: Arc<dyn ProductRepository>, thresholds: &ThresholdConfig) -> Self {
        Self {
            repository,
            sample_refs: thresholds.sample_refs.min(MAX_SAMPLE_REFS),
        }
    }

    /// Group live products by `dimensions`, returning at most `cap` groups.
    pub fn compute(&self, dimensions: &[Dimension], cap: usize) -> ComputationResult<Vec<FacetGroup>> {
        if dimensions.is_empty() || dimensions.len() > 3 {
            return Err(ComputationError::InvalidKey(format!(
                "facet index takes 1 to 3 dimensions, got {}",
                dimensions.len()
            )));
        }

        let products = self.repository.query(true, dimensions)?;
        let mut groups: HashMap<Vec<String>, GroupAccumulator> = HashMap::new();

        for product in products.iter().filter(|p| p.is_live() && p.has_dimensions(dimensions)) {
            let values: Vec<String> = dimensions
                .iter()
                .map(|d| d.normalize(product.dimension_value(*d)))
                .collect();
            if values.iter().any(String::is_empty) {
                continue;
            }
            let raw: Vec<String> = dimensions
                .iter()
                .map(|d| product.dimension_value(*d).trim().to_string())
                .collect();

            let group = groups.entry(values).or_default();
            group.count += 1;
            group.refs.push(ProductRef {
                id: product.id,
                slug: product.slug.clone(),
            });
            *group.raw_values.entry(raw).or_default() += 1;
        }

        let mut out: Vec<FacetGroup> = groups
            .into_iter()
            .map(|(values, mut acc)| {
                acc.refs.sort();
                acc.refs.truncate(self.sample_refs);
                let label = acc
                    .raw_values
                    .into_iter()
                    .max_by(|(a_raw, a_n), (b_raw, b_n)| a_n.cmp(b_n).then_with(|| b_raw.cmp(a_raw)))
                    .map(|(raw, _)| raw)
                    .unwrap_or_else(|| values.clone());
                FacetGroup {
                    values,
                    count: acc.count,
                    sample_refs: acc.refs,
                    label,
                }
            })
            .collect();

        out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.values.cmp(&b.values)));
        out.truncate(cap);
        Ok(out)
    }

    /// Compute the full, uncached snapshot for one hub type.
    pub fn snapshot(&self, hub_type: HubType, thresholds: &ThresholdConfig) -> ComputationResult<AllowListSnapshot> {
        let groups = self.compute(hub_type.dimensions(), hub_type.cap(thresholds))?;
        let mut entries = Vec::with_capacity(groups.len());
        let mut labels = BTreeMap::new();
        for group in groups {
            let key = FacetKey::new(hub_type, group.values)?;
            labels.insert(key.facet_string(), group.label);
            entries.push(AllowListEntry {
                key,
                count: group.count,
                sample_refs: group.sample_refs,
            });
        }
        Ok(AllowListSnapshot {
            hub_type,
            entries,
            labels,
            source: SnapshotSource::Fresh,
            computed_at: unix_now(),
        })
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
