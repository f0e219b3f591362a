//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use facet_hubs::cache::{Cache, CacheError, MemoryCache};
use facet_hubs::catalog::{ContentOverride, InMemoryContentStore, InMemoryRepository, Product, ProductRepository, RepositoryError};
use facet_hubs::config::HubConfig;
use facet_hubs::facets::{Dimension, FacetKey};
use facet_hubs::HubServices;

pub fn truck(id: u64, line: &str, category: &str, formula: &str, engine: &str) -> Product {
    Product {
        id,
        slug: format!("truck-{}", id),
        line: line.into(),
        category: category.into(),
        wheel_formula: formula.into(),
        engine_model: engine.into(),
        model_code: format!("SX{}", 4000 + id),
        active: true,
        in_stock: false,
        updated_at: None,
    }
}

/// A small catalog with thick, thin and inactive combinations.
pub fn fleet() -> Vec<Product> {
    let mut products = vec![
        truck(1, "X3000", "Tractors", "6x4", "WP13.550E501"),
        truck(2, "X3000", "Tractors", "6X4", "wp13.550e501"),
        truck(3, "X3000", "Tractors", "4x2", "WP12.430E50"),
        truck(4, "X5000", "Dump Trucks", "8x4", "WP10.336E53"),
        truck(5, "X5000", "Tractors", "6x4", "WP13.550E501"),
        truck(6, "M3000", "Dump Trucks", "8×4", "WP12.430E50"),
    ];
    products[0].in_stock = true;
    products[1].in_stock = true;
    products[4].active = false;
    products[1].updated_at = Some("2024-05-01T08:00:00Z".parse().unwrap());
    products
}

pub fn config() -> HubConfig {
    let mut config = HubConfig::default();
    config.site.base_url = "https://trucks.example".into();
    config.admin.enabled = true;
    config.admin.api_key = "test-admin-key".into();
    config.observability.metrics_enabled = false;
    config
}

pub fn services_with(
    products: Vec<Product>,
    content: Vec<ContentOverride>,
    cache: Option<Arc<dyn Cache>>,
) -> HubServices {
    HubServices::new(
        &config(),
        Arc::new(InMemoryRepository::new(products)),
        Arc::new(InMemoryContentStore::new(content)),
        cache,
    )
}

pub fn services() -> HubServices {
    services_with(fleet(), Vec::new(), Some(Arc::new(MemoryCache::new())))
}

pub fn force_index(key: FacetKey, body_len: usize, faq_count: usize) -> ContentOverride {
    ContentOverride {
        key,
        force_index: true,
        body_len,
        faq_count,
    }
}

/// Cache backend that is never reachable.
#[derive(Default)]
pub struct UnreachableCache {
    pub calls: AtomicUsize,
}

impl UnreachableCache {
    fn fail<T>(&self) -> Result<T, CacheError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("connection refused".into()))
    }
}

impl Cache for UnreachableCache {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.fail()
    }

    fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        self.fail()
    }

    fn delete(&self, _key: &str) -> Result<(), CacheError> {
        self.fail()
    }
}

/// Repository whose backing store is down.
pub struct BrokenRepository;

impl ProductRepository for BrokenRepository {
    fn query(&self, _active_only: bool, _dimensions: &[Dimension]) -> Result<Vec<Product>, RepositoryError> {
        Err(RepositoryError::Unavailable("connection reset".into()))
    }

    fn live_count(&self, _key: &FacetKey, _in_stock_only: bool) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unavailable("connection reset".into()))
    }
}
