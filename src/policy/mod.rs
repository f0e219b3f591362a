//! Crawler indexability policy.

pub mod indexability;

pub use indexability::{IndexabilityPolicy, INDEX_FOLLOW, NOINDEX_FOLLOW};
