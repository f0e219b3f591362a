//! Catalog projection types and error definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::facets::key::FacetKey;
use crate::facets::normalize::Dimension;

/// Read-only projection of a catalog product.
///
/// Owned by the product repository; nothing in this crate mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub line: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub wheel_formula: String,
    #[serde(default)]
    pub engine_model: String,
    #[serde(default)]
    pub model_code: String,
    pub active: bool,
    /// Stock quantity above zero.
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The population predicate shared by allow-list computation and live counts.
    pub fn is_live(&self) -> bool {
        self.active
    }

    /// Raw attribute value for a facet dimension.
    pub fn dimension_value(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Line => &self.line,
            Dimension::Category => &self.category,
            Dimension::Formula => &self.wheel_formula,
            Dimension::Engine => &self.engine_model,
            Dimension::ModelCode => &self.model_code,
        }
    }

    /// True when every requested dimension carries a non-blank raw value.
    pub fn has_dimensions(&self, dimensions: &[Dimension]) -> bool {
        dimensions
            .iter()
            .all(|d| !self.dimension_value(*d).trim().is_empty())
    }
}

/// SEO override for one hub, supplied by the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentOverride {
    pub key: FacetKey,
    pub force_index: bool,
    /// Visible text length of the hub body.
    pub body_len: usize,
    pub faq_count: usize,
}

/// Errors raised by a product repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Backing store could not be read.
    #[error("repository unavailable: {0}")]
    Unavailable(String),

    /// Snapshot data could not be decoded.
    #[error("invalid inventory data: {0}")]
    Decode(String),
}

/// Errors raised by an SEO content store.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid content record {facet_key:?}: {reason}")]
    InvalidRecord { facet_key: String, reason: String },
}
