//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, request ID, tracing, timeout, body limit)
//!     → request.rs (request ID, diagnostics flag, hub path rebuild)
//!     → HubResolver / SitemapSynchronizer
//!     → response.rs (status, robots and canonical headers)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{X_HUB_DIAG, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
