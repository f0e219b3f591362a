//! SEO content store.
//!
//! # Responsibilities
//! - Look up the content override for a hub
//! - Derive body length and FAQ count from stored content records
//!
//! # Design Decisions
//! - Facet keys are normalized on load, so lookups are case-insensitive
//! - Body length counts visible text only (tags stripped, whitespace collapsed)
//! - Records with keys that cannot be parsed are skipped with a warning

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use crate::catalog::types::{ContentError, ContentOverride};
use crate::facets::hub_type::HubType;
use crate::facets::key::FacetKey;

/// Source of per-hub SEO overrides.
pub trait SeoContentStore: Send + Sync {
    fn get(&self, key: &FacetKey) -> Result<Option<ContentOverride>, ContentError>;
}

/// Editor-facing content record as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentRecord {
    pub hub_type: Option<HubType>,
    pub facet_key: String,
    pub force_index: bool,
    pub body_html: String,
    pub seo_text: String,
    /// One `question | answer` pair per line.
    pub faq: String,
}

impl ContentRecord {
    pub fn to_override(&self) -> Result<ContentOverride, ContentError> {
        let hub_type = self.hub_type.ok_or_else(|| ContentError::InvalidRecord {
            facet_key: self.facet_key.clone(),
            reason: "missing hub_type".into(),
        })?;
        let key = FacetKey::from_facet_string(hub_type, &self.facet_key).map_err(|e| {
            ContentError::InvalidRecord {
                facet_key: self.facet_key.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(ContentOverride {
            key,
            force_index: self.force_index,
            body_len: visible_len(&self.body_html).max(visible_len(&self.seo_text)),
            faq_count: faq_count(&self.faq),
        })
    }
}

/// Length in characters of the visible text of an HTML fragment.
pub fn visible_len(html: &str) -> usize {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0;
    }
    words.iter().map(|w| w.chars().count()).sum::<usize>() + words.len() - 1
}

/// Number of FAQ lines in `question | answer` form.
pub fn faq_count(faq: &str) -> usize {
    faq.lines().filter(|line| line.trim().contains('|')).count()
}

/// Content store over an in-memory record set.
#[derive(Default)]
pub struct InMemoryContentStore {
    overrides: ArcSwap<HashMap<FacetKey, ContentOverride>>,
}

impl InMemoryContentStore {
    pub fn new(overrides: Vec<ContentOverride>) -> Self {
        let store = Self::default();
        store.replace(overrides);
        store
    }

    /// Build from raw records, skipping the ones that cannot be keyed.
    pub fn from_records(records: &[ContentRecord]) -> Self {
        Self::new(convert_records(records))
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ContentError> {
        Ok(Self::from_records(&read_records(path)?))
    }

    pub fn replace(&self, overrides: Vec<ContentOverride>) {
        let map = overrides.into_iter().map(|o| (o.key.clone(), o)).collect();
        self.overrides.store(Arc::new(map));
    }

    pub fn reload_from_file(&self, path: &Path) -> Result<usize, ContentError> {
        let overrides = convert_records(&read_records(path)?);
        let count = overrides.len();
        self.replace(overrides);
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.overrides.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SeoContentStore for InMemoryContentStore {
    fn get(&self, key: &FacetKey) -> Result<Option<ContentOverride>, ContentError> {
        Ok(self.overrides.load().get(key).cloned())
    }
}

fn convert_records(records: &[ContentRecord]) -> Vec<ContentOverride> {
    records
        .iter()
        .filter_map(|record| match record.to_override() {
            Ok(o) => Some(o),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping content record");
                None
            }
        })
        .collect()
}

fn read_records(path: &Path) -> Result<Vec<ContentRecord>, ContentError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ContentError::Unavailable(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| ContentError::Unavailable(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_len_strips_tags_and_collapses_whitespace() {
        assert_eq!(visible_len("<p>Hello,\n   <b>world</b></p>"), "Hello, world".len());
        assert_eq!(visible_len("   "), 0);
        assert_eq!(visible_len("<br/>"), 0);
        assert_eq!(visible_len("Тягач"), 5);
    }

    #[test]
    fn test_faq_count() {
        let faq = "Q1 | A1\nno pipe here\n  Q2|A2  \n\nQ3 | A3";
        assert_eq!(faq_count(faq), 3);
    }

    #[test]
    fn test_record_lookup_is_case_insensitive() {
        let store = InMemoryContentStore::from_records(&[ContentRecord {
            hub_type: Some(HubType::CategoryLine),
            facet_key: "Tractors:X3000".into(),
            force_index: true,
            body_html: "x".repeat(1600),
            ..Default::default()
        }]);
        let key = FacetKey::from_raw(HubType::CategoryLine, &["tractors", "x3000"]).unwrap();
        let found = store.get(&key).unwrap().unwrap();
        assert!(found.force_index);
        assert_eq!(found.body_len, 1600);
    }

    #[test]
    fn test_bad_records_are_skipped() {
        let store = InMemoryContentStore::from_records(&[
            ContentRecord {
                hub_type: None,
                facet_key: "x3000".into(),
                ..Default::default()
            },
            ContentRecord {
                hub_type: Some(HubType::LineFormula),
                facet_key: "x3000".into(),
                ..Default::default()
            },
        ]);
        assert!(store.is_empty());
    }
}
