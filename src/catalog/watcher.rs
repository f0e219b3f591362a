//! Inventory file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::catalog::content::InMemoryContentStore;
use crate::catalog::repository::InMemoryRepository;
use crate::facets::allow_list::AllowListResolver;

/// Reloads inventory snapshots when their files change.
///
/// Every successful reload invalidates all cached allow-lists. A failed reload
/// keeps the current snapshot.
#[derive(Clone)]
pub struct InventoryWatcher {
    products_path: Option<PathBuf>,
    content_path: Option<PathBuf>,
    repository: Arc<InMemoryRepository>,
    content: Arc<InMemoryContentStore>,
    allow_list: AllowListResolver,
}

impl InventoryWatcher {
    pub fn new(
        products_path: Option<PathBuf>,
        content_path: Option<PathBuf>,
        repository: Arc<InMemoryRepository>,
        content: Arc<InMemoryContentStore>,
        allow_list: AllowListResolver,
    ) -> Self {
        Self {
            products_path,
            content_path,
            repository,
            content,
            allow_list,
        }
    }

    /// Reload whichever watched files appear in `paths`.
    ///
    /// Returns true when at least one snapshot was replaced.
    pub fn handle_change(&self, paths: &[PathBuf]) -> bool {
        let mut reloaded = false;

        if let Some(products) = self.products_path.as_deref().filter(|p| touches(paths, p)) {
            match self.repository.reload_from_file(products) {
                Ok(count) => {
                    tracing::info!(path = %products.display(), products = count, "Inventory reloaded");
                    reloaded = true;
                }
                Err(e) => tracing::error!(error = %e, "Failed to reload inventory, keeping current snapshot"),
            }
        }

        if let Some(content) = self.content_path.as_deref().filter(|p| touches(paths, p)) {
            match self.content.reload_from_file(content) {
                Ok(count) => {
                    tracing::info!(path = %content.display(), overrides = count, "SEO content reloaded");
                    reloaded = true;
                }
                Err(e) => tracing::error!(error = %e, "Failed to reload SEO content, keeping current snapshot"),
            }
        }

        if reloaded {
            self.allow_list.invalidate_all();
        }
        reloaded
    }

    /// Start watching in a background thread. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let handler = self.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        handler.handle_change(&event.paths);
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        for path in self.products_path.iter().chain(self.content_path.iter()) {
            watcher.watch(path, RecursiveMode::NonRecursive)?;
            tracing::info!(path = ?path, "Inventory watcher started");
        }
        Ok(watcher)
    }
}

fn touches(paths: &[PathBuf], watched: &Path) -> bool {
    paths.iter().any(|p| {
        p == watched
            || match (p.canonicalize(), watched.canonicalize()) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheLayer, MemoryCache};
    use crate::config::ThresholdConfig;
    use crate::facets::hub_type::HubType;
    use crate::facets::index::FacetIndex;
    use crate::facets::types::SnapshotSource;
    use std::io::Write;

    const TWO_TRUCKS: &str = r#"[
        {"id": 1, "engine_model": "WP13.550E501", "active": true},
        {"id": 2, "engine_model": "WP13.550E501", "active": true}
    ]"#;

    #[test]
    fn test_reload_invalidates_cached_allow_lists() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", TWO_TRUCKS).unwrap();

        let repository = Arc::new(InMemoryRepository::load_from_file(file.path()).unwrap());
        let thresholds = ThresholdConfig::default();
        let cache = Arc::new(CacheLayer::new(Arc::new(MemoryCache::new()), Duration::from_secs(300)));
        let allow_list = AllowListResolver::new(FacetIndex::new(repository.clone(), &thresholds), Some(cache), thresholds);
        let watcher = InventoryWatcher::new(
            Some(file.path().to_path_buf()),
            None,
            repository.clone(),
            Arc::new(InMemoryContentStore::default()),
            allow_list.clone(),
        );

        assert_eq!(allow_list.allowed(HubType::Engine, 2).unwrap().len(), 1);
        assert_eq!(allow_list.snapshot(HubType::Engine).unwrap().source, SnapshotSource::Cached);

        std::fs::write(file.path(), "[]").unwrap();
        assert!(watcher.handle_change(&[file.path().to_path_buf()]));
        assert!(repository.is_empty());
        assert!(allow_list.allowed(HubType::Engine, 1).unwrap().is_empty());
    }

    #[test]
    fn test_broken_file_keeps_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", TWO_TRUCKS).unwrap();
        let repository = Arc::new(InMemoryRepository::load_from_file(file.path()).unwrap());
        let thresholds = ThresholdConfig::default();
        let allow_list = AllowListResolver::new(FacetIndex::new(repository.clone(), &thresholds), None, thresholds);
        let watcher = InventoryWatcher::new(
            Some(file.path().to_path_buf()),
            None,
            repository.clone(),
            Arc::new(InMemoryContentStore::default()),
            allow_list,
        );

        std::fs::write(file.path(), "{not json").unwrap();
        assert!(!watcher.handle_change(&[file.path().to_path_buf()]));
        assert_eq!(repository.len(), 2);
    }

    #[test]
    fn test_unrelated_paths_are_ignored() {
        let repository = Arc::new(InMemoryRepository::default());
        let thresholds = ThresholdConfig::default();
        let allow_list = AllowListResolver::new(FacetIndex::new(repository.clone(), &thresholds), None, thresholds);
        let watcher = InventoryWatcher::new(
            Some(PathBuf::from("/nonexistent/products.json")),
            None,
            repository,
            Arc::new(InMemoryContentStore::default()),
            allow_list,
        );
        assert!(!watcher.handle_change(&[PathBuf::from("/tmp/other.json")]));
    }
}
