//! Related hub links.
//!
//! Links point at allow-list entries of other hub types that share at least
//! one facet value with the current hub and that are indexable, either by
//! snapshot population or through a qualifying content override. Keys whose
//! parent allow-list rejects them are never linked. Ordered by count
//! descending, then path.

use serde::Serialize;

use crate::facets::hub_type::HubType;
use crate::facets::key::FacetKey;
use crate::hub::resolver::HubResolver;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedLink {
    pub hub_type: HubType,
    pub path: String,
    pub title: String,
    pub count: u64,
}

fn shares_value(a: &FacetKey, b: &FacetKey) -> bool {
    a.hub_type()
        .dimensions()
        .iter()
        .any(|d| a.value_of(*d).is_some() && a.value_of(*d) == b.value_of(*d))
}

pub fn related_links(resolver: &HubResolver, key: &FacetKey, cap: usize) -> Vec<RelatedLink> {
    if cap == 0 {
        return Vec::new();
    }
    let policy = resolver.policy();
    let floor = policy.hub_index_min();
    let mut links = Vec::new();

    for hub_type in HubType::all().filter(|t| *t != key.hub_type()) {
        if !hub_type.dimensions().iter().any(|d| key.value_of(*d).is_some()) {
            continue;
        }
        let snapshot = match resolver.allow_list().snapshot(hub_type) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::debug!(hub_type = %hub_type, error = %e, "Skipping related links");
                continue;
            }
        };
        let min = floor.max(hub_type.min_count());
        let candidates = snapshot
            .entries
            .iter()
            .filter(|e| e.count >= hub_type.min_count() && shares_value(&e.key, key));
        for entry in candidates {
            let indexable = entry.count >= min
                || policy.override_qualifies(&entry.key, resolver.content_for(&entry.key).as_ref());
            if !indexable || !resolver.allow_list().parent_admits(&entry.key).unwrap_or(false) {
                continue;
            }
            links.push(RelatedLink {
                hub_type,
                path: entry.key.path(resolver.hub_prefix(), false),
                title: hub_type.title(&snapshot.labels_for(&entry.key), false),
                count: entry.count,
            });
        }
    }

    links.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.path.cmp(&b.path)));
    links.truncate(cap);
    links
}
