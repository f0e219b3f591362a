//! Hub resolution.
//!
//! # Data Flow
//! ```text
//! GET /hub/{*path}
//!     → path.rs (segments → FacetKey + in-stock flag)
//!     → resolver.rs (allow-list, live count, indexability, pagination)
//!     → related.rs (links to overlapping indexable hubs)
//! Admin
//!     → thin.rs (populated hubs below the indexing minimum)
//! ```

pub mod path;
pub mod related;
pub mod resolver;
pub mod thin;

pub use path::{parse_hub_path, HubPath, HubPathError};
pub use related::RelatedLink;
pub use resolver::{Assessment, HubOutcome, HubPage, HubRequest, HubResolver, NotFoundReason};
pub use thin::{thin_hubs, ThinHub};
