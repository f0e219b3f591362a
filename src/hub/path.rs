//! Hub path parsing.
//!
//! # Grammar
//! ```text
//! <dimA>/<valueA>[/<dimB>/<valueB>[/<dimC>/<valueC>]][/in-stock][/]
//! ```
//! Dimension names are matched case-insensitively; values go through the same
//! normalization as the facet index. Empty segments are ignored, so the
//! canonical-path redirect can clean up doubled or missing slashes.

use thiserror::Error;

use crate::facets::hub_type::HubType;
use crate::facets::key::FacetKey;
use crate::facets::normalize::Dimension;

pub const IN_STOCK_SEGMENT: &str = "in-stock";

/// Why a path does not name a hub.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubPathError {
    #[error("empty hub path")]
    Empty,

    #[error("expected dimension/value pairs, got {0} segments")]
    OddSegments(usize),

    #[error("hub paths take 1 to 3 facets, got {0}")]
    TooManyFacets(usize),

    #[error("unknown dimension {0:?}")]
    UnknownDimension(String),

    #[error("no hub type for dimensions {0}")]
    UnknownCombination(String),

    #[error("invalid facet value: {0}")]
    InvalidValue(String),
}

/// A parsed hub path: the facet key plus the in-stock flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubPath {
    pub key: FacetKey,
    pub in_stock: bool,
}

/// Parse the part of a hub path below the hub prefix.
pub fn parse_hub_path(path: &str) -> Result<HubPath, HubPathError> {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.trim().is_empty()).collect();
    if segments.is_empty() {
        return Err(HubPathError::Empty);
    }

    let mut in_stock = false;
    if segments.len() % 2 == 1 {
        match segments.last() {
            Some(last) if last.trim().eq_ignore_ascii_case(IN_STOCK_SEGMENT) => {
                in_stock = true;
                segments.pop();
            }
            _ => return Err(HubPathError::OddSegments(segments.len())),
        }
    }
    if segments.is_empty() {
        return Err(HubPathError::Empty);
    }

    let pairs = segments.len() / 2;
    if pairs > 3 {
        return Err(HubPathError::TooManyFacets(pairs));
    }

    let mut dimensions = Vec::with_capacity(pairs);
    let mut values = Vec::with_capacity(pairs);
    for pair in segments.chunks(2) {
        let dimension = Dimension::from_url_name(pair[0].trim())
            .ok_or_else(|| HubPathError::UnknownDimension(pair[0].to_string()))?;
        dimensions.push(dimension);
        values.push(pair[1]);
    }

    let hub_type = HubType::from_dimensions(&dimensions).ok_or_else(|| {
        let names: Vec<&str> = dimensions.iter().map(|d| d.url_name()).collect();
        HubPathError::UnknownCombination(names.join("/"))
    })?;
    let key = FacetKey::from_raw(hub_type, &values).map_err(|e| HubPathError::InvalidValue(e.to_string()))?;

    Ok(HubPath { key, in_stock })
}
