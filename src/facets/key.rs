//! Facet keys: a hub type plus its normalized facet values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::types::Product;
use crate::facets::hub_type::HubType;
use crate::facets::normalize::Dimension;
use crate::facets::types::{ComputationError, ComputationResult};

/// Ordered tuple of normalized slugs identifying one hub.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FacetKey {
    hub_type: HubType,
    values: Vec<String>,
}

impl FacetKey {
    /// Build a key from values that are already normalized.
    ///
    /// Fails when the arity is wrong or a value is not in normal form.
    pub fn new(hub_type: HubType, values: Vec<String>) -> ComputationResult<Self> {
        let dims = hub_type.dimensions();
        if values.len() != dims.len() {
            return Err(ComputationError::InvalidKey(format!(
                "{} takes {} values, got {}",
                hub_type,
                dims.len(),
                values.len()
            )));
        }
        for (dim, value) in dims.iter().zip(&values) {
            if value.is_empty() || dim.normalize(value) != *value {
                return Err(ComputationError::InvalidKey(format!(
                    "{:?} is not a normalized {} value",
                    value,
                    dim.url_name()
                )));
            }
        }
        Ok(Self { hub_type, values })
    }

    /// Build a key by normalizing raw values.
    pub fn from_raw<S: AsRef<str>>(hub_type: HubType, raw: &[S]) -> ComputationResult<Self> {
        if raw.len() != hub_type.dimensions().len() {
            return Err(ComputationError::InvalidKey(format!(
                "{} takes {} values, got {}",
                hub_type,
                hub_type.dimensions().len(),
                raw.len()
            )));
        }
        let values = hub_type
            .dimensions()
            .iter()
            .zip(raw)
            .map(|(dim, value)| dim.normalize(value.as_ref()))
            .collect();
        Self::new(hub_type, values)
    }

    /// Parse the `a:b:c` content-store form.
    pub fn from_facet_string(hub_type: HubType, facet_key: &str) -> ComputationResult<Self> {
        let parts: Vec<&str> = facet_key.split(':').collect();
        Self::from_raw(hub_type, &parts)
    }

    pub fn hub_type(&self) -> HubType {
        self.hub_type
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Values joined with `:`, the form content records are keyed by.
    pub fn facet_string(&self) -> String {
        self.values.join(":")
    }

    /// Canonical hub path under `prefix`, always with a trailing slash.
    pub fn path(&self, prefix: &str, in_stock: bool) -> String {
        let mut path = String::from(prefix);
        for (dim, value) in self.hub_type.dimensions().iter().zip(&self.values) {
            path.push('/');
            path.push_str(dim.url_name());
            path.push('/');
            path.push_str(value);
        }
        if in_stock {
            path.push_str("/in-stock");
        }
        path.push('/');
        path
    }

    /// Does `product` belong to this hub (ignoring liveness)?
    pub fn matches(&self, product: &Product) -> bool {
        self.hub_type
            .dimensions()
            .iter()
            .zip(&self.values)
            .all(|(dim, value)| dim.normalize(product.dimension_value(*dim)) == *value)
    }

    /// Value of `dimension` in this key, if the hub type has it.
    pub fn value_of(&self, dimension: Dimension) -> Option<&str> {
        self.hub_type
            .dimensions()
            .iter()
            .position(|d| *d == dimension)
            .map(|i| self.values[i].as_str())
    }

    /// Key of the parent hub type, e.g. the engine of a category/engine key.
    pub fn parent_key(&self) -> Option<FacetKey> {
        let parent = self.hub_type.parent()?;
        let values = parent
            .dimensions()
            .iter()
            .map(|d| self.value_of(*d).map(str::to_string))
            .collect::<Option<Vec<_>>>()?;
        Some(FacetKey {
            hub_type: parent,
            values,
        })
    }
}

impl fmt::Display for FacetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hub_type, self.facet_string())
    }
}
