//! Product repository interface and the in-memory snapshot implementation.
//!
//! # Responsibilities
//! - Serve active products carrying the requested dimensions
//! - Count the live population of one hub
//! - Swap in a new inventory snapshot atomically on reload
//!
//! # Design Decisions
//! - The repository is the single source of truth; nothing here persists
//! - Liveness is `Product::is_live` everywhere, membership is `FacetKey::matches`

use std::fs;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};

use crate::catalog::types::{Product, RepositoryError};
use crate::facets::key::FacetKey;
use crate::facets::normalize::Dimension;

/// Read access to the product catalog.
pub trait ProductRepository: Send + Sync {
    /// Products that carry every requested dimension; live ones only when `active_only`.
    fn query(&self, active_only: bool, dimensions: &[Dimension]) -> Result<Vec<Product>, RepositoryError>;

    /// Live population of a hub, optionally restricted to in-stock products.
    fn live_count(&self, key: &FacetKey, in_stock_only: bool) -> Result<u64, RepositoryError>;

    /// Latest update among the hub's live products, for sitemap `<lastmod>`.
    fn last_modified(&self, _key: &FacetKey, _in_stock_only: bool) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        Ok(None)
    }
}

/// Repository over an in-memory inventory snapshot.
#[derive(Default)]
pub struct InMemoryRepository {
    products: ArcSwap<Vec<Product>>,
}

impl InMemoryRepository {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: ArcSwap::from_pointee(products),
        }
    }

    /// Load a JSON array of products.
    pub fn load_from_file(path: &Path) -> Result<Self, RepositoryError> {
        Ok(Self::new(read_products(path)?))
    }

    /// Replace the snapshot; readers see either the old or the new one.
    pub fn replace(&self, products: Vec<Product>) {
        self.products.store(Arc::new(products));
    }

    /// Reload the snapshot from disk, keeping the current one on failure.
    pub fn reload_from_file(&self, path: &Path) -> Result<usize, RepositoryError> {
        let products = read_products(path)?;
        let count = products.len();
        self.replace(products);
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.products.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live_members<'a>(
        products: &'a [Product],
        key: &'a FacetKey,
        in_stock_only: bool,
    ) -> impl Iterator<Item = &'a Product> + 'a {
        products
            .iter()
            .filter(move |p| p.is_live() && (!in_stock_only || p.in_stock) && key.matches(p))
    }
}

impl ProductRepository for InMemoryRepository {
    fn query(&self, active_only: bool, dimensions: &[Dimension]) -> Result<Vec<Product>, RepositoryError> {
        let snapshot = self.products.load();
        Ok(snapshot
            .iter()
            .filter(|p| (!active_only || p.is_live()) && p.has_dimensions(dimensions))
            .cloned()
            .collect())
    }

    fn live_count(&self, key: &FacetKey, in_stock_only: bool) -> Result<u64, RepositoryError> {
        let snapshot = self.products.load();
        Ok(Self::live_members(&snapshot, key, in_stock_only).count() as u64)
    }

    fn last_modified(&self, key: &FacetKey, in_stock_only: bool) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let snapshot = self.products.load();
        Ok(Self::live_members(&snapshot, key, in_stock_only)
            .filter_map(|p| p.updated_at)
            .max())
    }
}

fn read_products(path: &Path) -> Result<Vec<Product>, RepositoryError> {
    let content = fs::read_to_string(path)
        .map_err(|e| RepositoryError::Unavailable(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| RepositoryError::Decode(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::hub_type::HubType;
    use std::io::Write;

    fn truck(id: u64, engine: &str, active: bool, in_stock: bool) -> Product {
        Product {
            id,
            slug: format!("truck-{}", id),
            line: "X3000".into(),
            category: "Tractors".into(),
            wheel_formula: "6x4".into(),
            engine_model: engine.into(),
            model_code: String::new(),
            active,
            in_stock,
            updated_at: None,
        }
    }

    #[test]
    fn test_query_filters_inactive_and_blank() {
        let repo = InMemoryRepository::new(vec![
            truck(1, "WP13.550E501", true, false),
            truck(2, "", true, false),
            truck(3, "WP13.550E501", false, false),
        ]);
        let live = repo.query(true, &[Dimension::Engine]).unwrap();
        assert_eq!(live.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);
        let all = repo.query(false, &[Dimension::Engine]).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_live_count_matches_normalized_values() {
        let repo = InMemoryRepository::new(vec![
            truck(1, "WP13.550E501", true, true),
            truck(2, "wp13 550e501", true, false),
            truck(3, "WP13.550E501", false, true),
        ]);
        let key = FacetKey::from_raw(HubType::Engine, &["WP13.550E501"]).unwrap();
        assert_eq!(repo.live_count(&key, false).unwrap(), 2);
        assert_eq!(repo.live_count(&key, true).unwrap(), 1);
    }

    #[test]
    fn test_replace_swaps_snapshot() {
        let repo = InMemoryRepository::new(vec![truck(1, "WP13.550E501", true, false)]);
        let key = FacetKey::from_raw(HubType::Engine, &["WP13.550E501"]).unwrap();
        assert_eq!(repo.live_count(&key, false).unwrap(), 1);
        repo.replace(Vec::new());
        assert_eq!(repo.live_count(&key, false).unwrap(), 0);
        assert!(repo.is_empty());
    }

    #[test]
    fn test_reload_keeps_snapshot_on_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": 1, "engine_model": "WP10.336E53", "active": true}}]"#).unwrap();
        let repo = InMemoryRepository::load_from_file(file.path()).unwrap();
        assert_eq!(repo.len(), 1);

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        write!(broken, "not json").unwrap();
        let err = repo.reload_from_file(broken.path()).unwrap_err();
        assert!(matches!(err, RepositoryError::Decode(_)));
        assert_eq!(repo.len(), 1);
    }
}
