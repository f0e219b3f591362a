//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with hub, sitemap, health and admin routes
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Bind to a listener and shut down gracefully
//!
//! # Design Decisions
//! - Hub and sitemap handlers never answer 5xx; failures degrade inside the
//!   resolver and the synchronizer
//! - Handlers call the synchronous core directly; its work is bounded by caps

use std::time::{Duration, Instant};

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::HubConfig;
use crate::http::request::{diagnostics_requested, hub_request, request_id};
use crate::http::response::{hub_response, xml_response};
use crate::lifecycle::shutdown;
use crate::lifecycle::startup::HubServices;
use crate::observability::metrics;
use crate::sitemap::synchronizer::SitemapError;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: HubServices,
    pub admin_api_key: String,
}

/// HTTP server for hub pages and sitemaps.
pub struct HttpServer {
    router: Router,
    config: HubConfig,
}

impl HttpServer {
    pub fn new(config: HubConfig, services: HubServices) -> Self {
        let state = AppState {
            services,
            admin_api_key: config.admin.api_key.clone(),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &HubConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route(&format!("{}/{{*path}}", config.site.hub_prefix), get(hub_handler))
            .route("/sitemap.xml", get(sitemap_index_handler))
            .route("/health", get(health_handler))
            .route("/{file}", get(sitemap_section_handler));

        if config.admin.enabled {
            router = router.merge(admin::admin_router(state.clone()));
        }

        router
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown_rx` fires.
    pub async fn run(self, listener: TcpListener, shutdown_rx: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, hub_prefix = %self.config.site.hub_prefix, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }
}

async fn hub_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let resolver = &state.services.resolver;
    let request = hub_request(resolver.hub_prefix(), &path, query);

    let outcome = resolver.resolve(&request);
    tracing::debug!(
        request_id = %request_id(&headers),
        path = %request.path,
        outcome = outcome.label(),
        "Hub request resolved"
    );
    metrics::record_hub_request(outcome.label(), start.elapsed());
    hub_response(outcome, diagnostics_requested(&headers))
}

async fn sitemap_index_handler(State(state): State<AppState>) -> Response {
    xml_response(state.services.sitemap.render_index())
}

async fn sitemap_section_handler(State(state): State<AppState>, Path(file): Path<String>) -> Response {
    let Some(section) = file.strip_prefix("sitemap-").and_then(|f| f.strip_suffix(".xml")) else {
        return (StatusCode::NOT_FOUND, "404").into_response();
    };
    match state.services.sitemap.render_section(section) {
        Ok(xml) => xml_response(xml),
        Err(SitemapError::UnknownSection(_)) => (StatusCode::NOT_FOUND, "404").into_response(),
        Err(e) => {
            tracing::warn!(section = %section, error = %e, "Sitemap section failed");
            (StatusCode::NOT_FOUND, "404").into_response()
        }
    }
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
