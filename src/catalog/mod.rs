//! Catalog collaborators: product repository and SEO content store.
//!
//! # Data Flow
//! ```text
//! products.json ──▶ InMemoryRepository ──▶ FacetIndex / live counts
//! content.json  ──▶ InMemoryContentStore ──▶ IndexabilityPolicy overrides
//!        ▲
//!        └── watcher.rs reloads both and invalidates the allow-list cache
//! ```

pub mod content;
pub mod repository;
pub mod types;
pub mod watcher;

pub use content::{InMemoryContentStore, SeoContentStore};
pub use repository::{InMemoryRepository, ProductRepository};
pub use types::{ContentError, ContentOverride, Product, RepositoryError};
