//! Allow-list cache.
//!
//! # Data Flow
//! ```text
//! AllowListResolver
//!     → layer.rs (lookup / store, migration, disable-on-failure)
//!         → schema.rs (versioned payloads, v1 → v2 upgrade)
//!         → dyn Cache (memory.rs by default, any byte store in general)
//! ```
//!
//! # Design Decisions
//! - The backend is an injected trait object owned by the service instance
//! - Backends store opaque bytes; the payload schema lives in one place
//! - A backend failure never fails a computation, it only disables the cache

pub mod layer;
pub mod memory;
pub mod schema;

use std::time::Duration;

use thiserror::Error;

pub use layer::{CacheLayer, CacheLookup};
pub use memory::MemoryCache;

/// Errors raised by a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Backend could not be reached.
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    /// Backend rejected the operation.
    #[error("cache operation failed: {0}")]
    Operation(String),
}

/// Byte-oriented key/value store with per-entry TTL.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    fn delete(&self, key: &str) -> Result<(), CacheError>;
}
