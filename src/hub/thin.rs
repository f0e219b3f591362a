//! Thin hub report: allowed hubs below the indexing population.
//!
//! Every row comes from `HubResolver::assess`, so the report agrees with
//! what a request for the same path would get.

use serde::Serialize;

use crate::facets::hub_type::HubType;
use crate::hub::resolver::{HubResolver, NotFoundReason};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThinHub {
    pub hub_type: HubType,
    pub path: String,
    pub population: u64,
    pub force_index: bool,
    pub sufficient_content: bool,
    /// False when the allow-list still lists the key but live inventory no longer backs it.
    pub resolves: bool,
    /// An override makes this hub indexable despite its population.
    pub indexable: bool,
}

/// Allowed keys whose live population is under the indexing minimum.
pub fn thin_hubs(resolver: &HubResolver) -> Vec<ThinHub> {
    let policy = resolver.policy();
    let prefix = resolver.hub_prefix();
    let mut out = Vec::new();
    for hub_type in HubType::all() {
        let allowed = match resolver.allow_list().allowed(hub_type, hub_type.min_count()) {
            Ok(allowed) => allowed,
            Err(e) => {
                tracing::warn!(hub_type = %hub_type, error = %e, "Skipping hub type in thin hub report");
                continue;
            }
        };
        for key in allowed {
            let row = match resolver.assess(&key, false) {
                Ok(a) if a.population >= policy.hub_index_min() => continue,
                Ok(a) => ThinHub {
                    hub_type,
                    path: a.path(prefix),
                    population: a.population,
                    force_index: a.content.as_ref().is_some_and(|c| c.force_index),
                    sufficient_content: a.content.as_ref().is_some_and(|c| policy.sufficient_content(c)),
                    resolves: true,
                    indexable: a.indexable,
                },
                Err(NotFoundReason::ZeroPopulation) => {
                    let content = resolver.content_for(&key);
                    ThinHub {
                        hub_type,
                        path: key.path(prefix, false),
                        population: 0,
                        force_index: content.as_ref().is_some_and(|c| c.force_index),
                        sufficient_content: content.as_ref().is_some_and(|c| policy.sufficient_content(c)),
                        resolves: false,
                        indexable: false,
                    }
                }
                Err(reason) => {
                    tracing::debug!(key = %key, reason = reason.as_str(), "Left out of thin hub report");
                    continue;
                }
            };
            out.push(row);
        }
    }
    out
}
