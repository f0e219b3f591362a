//! Indexability decisions.
//!
//! One predicate decides both the robots directive of a hub response and its
//! sitemap membership. Callers never re-derive it.

use crate::catalog::types::ContentOverride;
use crate::config::ThresholdConfig;
use crate::facets::key::FacetKey;

pub const INDEX_FOLLOW: &str = "index,follow";
pub const NOINDEX_FOLLOW: &str = "noindex,follow";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexabilityPolicy {
    hub_index_min: u64,
    min_body_chars: usize,
    min_faq: usize,
}

impl Default for IndexabilityPolicy {
    fn default() -> Self {
        Self::from_thresholds(&ThresholdConfig::default())
    }
}

impl IndexabilityPolicy {
    pub fn from_thresholds(thresholds: &ThresholdConfig) -> Self {
        Self {
            hub_index_min: thresholds.hub_index_min,
            min_body_chars: thresholds.force_index_min_body_chars,
            min_faq: thresholds.force_index_min_faq,
        }
    }

    /// Population at which a hub is indexable without an override.
    pub fn hub_index_min(&self) -> u64 {
        self.hub_index_min
    }

    /// Enough editorial content to justify indexing a thin hub.
    pub fn sufficient_content(&self, content: &ContentOverride) -> bool {
        content.body_len >= self.min_body_chars || content.faq_count >= self.min_faq
    }

    /// The override alone makes the hub at `key` indexable.
    ///
    /// An override recorded for a different key never counts.
    pub fn override_qualifies(&self, key: &FacetKey, content: Option<&ContentOverride>) -> bool {
        content.is_some_and(|c| c.key == *key && c.force_index && self.sufficient_content(c))
    }

    pub fn is_indexable(&self, key: &FacetKey, population: u64, content: Option<&ContentOverride>) -> bool {
        population >= self.hub_index_min || self.override_qualifies(key, content)
    }

    pub fn meta_robots(&self, indexable: bool) -> &'static str {
        if indexable {
            INDEX_FOLLOW
        } else {
            NOINDEX_FOLLOW
        }
    }
}
