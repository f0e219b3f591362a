//! Sitemap generation over the hub resolver.

pub mod synchronizer;
pub mod xml;

pub use synchronizer::{SitemapError, SitemapSection, SitemapSynchronizer};
pub use xml::SitemapUrl;
