//! Faceted SEO hub allow-lists.
//!
//! Decides, from live inventory, which facet combinations may exist as
//! crawlable hub URLs, and serves them consistently to both direct requests
//! and the sitemap.

// Core
pub mod cache;
pub mod catalog;
pub mod facets;
pub mod hub;
pub mod policy;
pub mod sitemap;

// Service surface
pub mod admin;
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::HubConfig;
pub use http::HttpServer;
pub use lifecycle::{HubServices, Shutdown};
