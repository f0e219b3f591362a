//! Facet aggregation and allow-lists.
//!
//! # Data Flow
//! ```text
//! ProductRepository
//!     → index.rs (normalize, group, count, cap)
//!     → allow_list.rs (cache lookup, threshold filter)
//!     → HubResolver / SitemapSynchronizer
//! ```

pub mod allow_list;
pub mod hub_type;
pub mod index;
pub mod key;
pub mod normalize;
pub mod types;

pub use allow_list::AllowListResolver;
pub use hub_type::HubType;
pub use index::FacetIndex;
pub use key::FacetKey;
pub use normalize::Dimension;
pub use types::{AllowListEntry, AllowListSnapshot, ComputationError, ComputationResult, ProductRef, SnapshotSource};
