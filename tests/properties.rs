//! Property tests over generated catalogs.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use facet_hubs::cache::schema::{legacy_key, CacheEntryV1, LegacyValue};
use facet_hubs::cache::{Cache, MemoryCache};
use facet_hubs::catalog::{ContentOverride, Product};
use facet_hubs::facets::{FacetKey, HubType, SnapshotSource};
use facet_hubs::hub::HubOutcome;

mod common;

const LINES: &[&str] = &["X3000", "X5000", "M3000"];
const CATEGORIES: &[&str] = &["Tractors", "Dump Trucks"];
const FORMULAS: &[&str] = &["6x4", "4x2", "8×4"];
const ENGINES: &[&str] = &["WP13.550E501", "WP12.430E50"];
const MODEL_CODES: &[&str] = &["SX4258NV384", "SX3258DR384"];

fn product_strategy() -> impl Strategy<Value = (usize, usize, usize, usize, usize, bool, bool)> {
    (
        0..LINES.len(),
        0..CATEGORIES.len(),
        0..FORMULAS.len(),
        0..ENGINES.len(),
        0..MODEL_CODES.len(),
        prop::bool::weighted(0.85),
        any::<bool>(),
    )
}

fn catalog_strategy() -> impl Strategy<Value = Vec<Product>> {
    prop::collection::vec(product_strategy(), 0..14).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (l, c, f, e, m, active, in_stock))| {
                let mut p = common::truck(i as u64 + 1, LINES[l], CATEGORIES[c], FORMULAS[f], ENGINES[e]);
                p.model_code = MODEL_CODES[m].into();
                p.active = active;
                p.in_stock = in_stock;
                p
            })
            .collect()
    })
}

/// (product pick, hub type pick, force_index, body_len, faq_count)
type OverridePick = (usize, usize, bool, usize, usize);

fn override_strategy() -> impl Strategy<Value = Vec<OverridePick>> {
    prop::collection::vec((any::<usize>(), any::<usize>(), any::<bool>(), 0..3000usize, 0..6usize), 0..10)
}

/// Content overrides keyed by the facet values of products in the catalog.
fn overrides_for(products: &[Product], picks: &[OverridePick]) -> Vec<ContentOverride> {
    if products.is_empty() {
        return Vec::new();
    }
    let hub_types: Vec<HubType> = HubType::all().collect();
    picks
        .iter()
        .filter_map(|&(p, t, force_index, body_len, faq_count)| {
            let product = &products[p % products.len()];
            let hub_type = hub_types[t % hub_types.len()];
            let raw: Vec<&str> = hub_type.dimensions().iter().map(|d| product.dimension_value(*d)).collect();
            let key = FacetKey::from_raw(hub_type, &raw).ok()?;
            Some(ContentOverride {
                key,
                force_index,
                body_len,
                faq_count,
            })
        })
        .collect()
}

fn strip_base(loc: &str) -> &str {
    loc.strip_prefix("https://trucks.example").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_sitemap_matches_resolver(products in catalog_strategy(), picks in override_strategy()) {
        let overrides = overrides_for(&products, &picks);
        let services = common::services_with(products, overrides.clone(), Some(Arc::new(MemoryCache::new())));

        let mut locs = BTreeSet::new();
        for section in services.sitemap.build() {
            for url in &section.urls {
                match services.resolver.resolve_path(strip_base(&url.loc), None) {
                    HubOutcome::Found(page) => {
                        prop_assert!(page.indexable, "{} is not indexable", url.loc);
                        prop_assert_eq!(page.meta_robots, "index,follow");
                    }
                    other => prop_assert!(false, "{} resolved to {:?}", url.loc, other),
                }
                locs.insert(url.loc.clone());
            }
        }

        for content in &overrides {
            if let HubOutcome::Found(page) = services.resolver.resolve_key(&content.key, false) {
                if page.indexable {
                    prop_assert!(
                        locs.contains(&page.canonical),
                        "indexable {} is missing from the sitemap", page.canonical
                    );
                }
            }
        }
    }

    #[test]
    fn prop_underpopulated_keys_never_resolve(products in catalog_strategy()) {
        let services = common::services_with(products.clone(), Vec::new(), None);
        for hub_type in HubType::all() {
            for product in &products {
                let raw: Vec<&str> = hub_type.dimensions().iter().map(|d| product.dimension_value(*d)).collect();
                let Ok(key) = FacetKey::from_raw(hub_type, &raw) else { continue };
                let population = products.iter().filter(|p| p.is_live() && key.matches(p)).count() as u64;
                if population < hub_type.min_count() {
                    let outcome = services.resolver.resolve_key(&key, false);
                    prop_assert!(
                        matches!(outcome, HubOutcome::NotFound { .. }),
                        "{} with population {} resolved to {:?}", key, population, outcome
                    );
                }
            }
        }
    }

    #[test]
    fn prop_migrated_legacy_entry_allows_same_keys(products in catalog_strategy()) {
        let fresh = common::services_with(products.clone(), Vec::new(), None);
        let legacy_backend = Arc::new(MemoryCache::new());

        for hub_type in HubType::all() {
            let snapshot = fresh.allow_list().snapshot(hub_type).unwrap();
            let legacy = CacheEntryV1 {
                entries: snapshot
                    .entries
                    .iter()
                    .map(|e| {
                        let value = LegacyValue {
                            label: snapshot.labels_for(&e.key).join(" / "),
                            count: e.count,
                        };
                        (e.key.facet_string(), value)
                    })
                    .collect(),
            };
            legacy_backend
                .set(&legacy_key(hub_type), serde_json::to_vec(&legacy).unwrap(), std::time::Duration::from_secs(60))
                .unwrap();
        }

        let migrated = common::services_with(products, Vec::new(), Some(legacy_backend.clone()));
        for hub_type in HubType::all() {
            let snapshot = migrated.allow_list().snapshot(hub_type).unwrap();
            prop_assert_eq!(snapshot.source, SnapshotSource::Migrated);
            prop_assert_eq!(
                migrated.allow_list().allowed(hub_type, hub_type.min_count()).unwrap(),
                fresh.allow_list().allowed(hub_type, hub_type.min_count()).unwrap()
            );
            prop_assert!(!legacy_backend.contains_key(&legacy_key(hub_type)));
        }
    }
}
