//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the inventory and SEO content snapshots
//! - Wire repository, cache, allow-lists, resolver and sitemap together
//! - Start the inventory watcher when configured
//!
//! # Design Decisions
//! - Fail fast: an unreadable inventory at startup is fatal
//! - A missing products path starts an empty catalog (every hub 404s)
//! - The in-process cache backend belongs to the service instance

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::RecommendedWatcher;
use thiserror::Error;

use crate::cache::{Cache, CacheLayer, MemoryCache};
use crate::catalog::content::{InMemoryContentStore, SeoContentStore};
use crate::catalog::repository::{InMemoryRepository, ProductRepository};
use crate::catalog::types::{ContentError, RepositoryError};
use crate::catalog::watcher::InventoryWatcher;
use crate::config::HubConfig;
use crate::facets::allow_list::AllowListResolver;
use crate::facets::index::FacetIndex;
use crate::hub::resolver::HubResolver;
use crate::sitemap::synchronizer::SitemapSynchronizer;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load inventory: {0}")]
    Inventory(#[from] RepositoryError),

    #[error("failed to load SEO content: {0}")]
    Content(#[from] ContentError),

    #[error("failed to start inventory watcher: {0}")]
    Watcher(#[from] notify::Error),
}

/// Every request-path service, built once and shared by handlers.
#[derive(Clone)]
pub struct HubServices {
    pub resolver: HubResolver,
    pub sitemap: SitemapSynchronizer,
    cache: Option<Arc<CacheLayer>>,
    started_at: Instant,
}

impl HubServices {
    /// Wire services over the given collaborators.
    ///
    /// `cache_backend` is ignored when caching is disabled in `config`.
    pub fn new(
        config: &HubConfig,
        repository: Arc<dyn ProductRepository>,
        content: Arc<dyn SeoContentStore>,
        cache_backend: Option<Arc<dyn Cache>>,
    ) -> Self {
        let cache = cache_backend
            .filter(|_| config.cache.enabled)
            .map(|backend| Arc::new(CacheLayer::new(backend, Duration::from_secs(config.cache.ttl_secs))));
        let index = FacetIndex::new(repository.clone(), &config.thresholds);
        let allow_list = AllowListResolver::new(index, cache.clone(), config.thresholds.clone());
        let resolver = HubResolver::new(allow_list, repository, content, config.site.clone());
        let sitemap = SitemapSynchronizer::new(resolver.clone(), config.sitemap.clone());
        Self {
            resolver,
            sitemap,
            cache,
            started_at: Instant::now(),
        }
    }

    pub fn allow_list(&self) -> &AllowListResolver {
        self.resolver.allow_list()
    }

    pub fn cache(&self) -> Option<&CacheLayer> {
        self.cache.as_deref()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Snapshot-backed collaborators that the watcher can reload.
pub struct Inventory {
    pub repository: Arc<InMemoryRepository>,
    pub content: Arc<InMemoryContentStore>,
}

impl Inventory {
    pub fn load(config: &HubConfig) -> Result<Self, StartupError> {
        let repository = match &config.inventory.products_path {
            Some(path) => InMemoryRepository::load_from_file(&PathBuf::from(path))?,
            None => {
                tracing::warn!("No products path configured, starting with an empty catalog");
                InMemoryRepository::default()
            }
        };
        let content = match &config.inventory.content_path {
            Some(path) => InMemoryContentStore::load_from_file(&PathBuf::from(path))?,
            None => InMemoryContentStore::default(),
        };
        tracing::info!(products = repository.len(), overrides = content.len(), "Inventory loaded");
        Ok(Self {
            repository: Arc::new(repository),
            content: Arc::new(content),
        })
    }
}

/// Load inventory and wire the services for `config`.
///
/// Returns the file watcher too when `inventory.watch` is on; keep it alive
/// for as long as reloads are wanted.
pub fn bootstrap(config: &HubConfig) -> Result<(HubServices, Option<RecommendedWatcher>), StartupError> {
    let inventory = Inventory::load(config)?;
    let backend: Arc<dyn Cache> = Arc::new(MemoryCache::new());
    let services = HubServices::new(
        config,
        inventory.repository.clone(),
        inventory.content.clone(),
        Some(backend),
    );

    let watched = config.inventory.products_path.is_some() || config.inventory.content_path.is_some();
    let watcher = if config.inventory.watch && watched {
        let watcher = InventoryWatcher::new(
            config.inventory.products_path.as_ref().map(PathBuf::from),
            config.inventory.content_path.as_ref().map(PathBuf::from),
            inventory.repository,
            inventory.content,
            services.allow_list().clone(),
        );
        Some(watcher.run()?)
    } else {
        None
    };

    Ok((services, watcher))
}
