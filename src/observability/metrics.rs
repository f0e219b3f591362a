//! Metrics collection and exposition.
//!
//! # Metrics
//! - `hub_requests_total` (counter): hub requests by outcome
//! - `hub_request_duration_seconds` (histogram): hub resolution latency
//! - `allow_list_computations_total` (counter): uncached computations by hub type
//! - `allow_list_cache_total` (counter): cache reads by result
//! - `sitemap_section_errors_total` (counter): skipped sitemap sections
//!
//! # Design Decisions
//! - Call sites use the `record_*` functions, never raw metric names
//! - Without an installed recorder every call is a no-op, so tests need no setup

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::facets::hub_type::HubType;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(address: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(address)
        .install()
        .map_err(|e| format!("failed to install metrics exporter: {}", e))?;
    tracing::info!(address = %address, "Metrics exporter listening");
    Ok(())
}

pub fn record_hub_request(outcome: &'static str, duration: Duration) {
    ::metrics::counter!("hub_requests_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("hub_request_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_allow_list_computation(hub_type: HubType) {
    ::metrics::counter!("allow_list_computations_total", "hub_type" => hub_type.name()).increment(1);
}

/// `result` is one of `hit`, `miss`, `migrated`, `disabled`.
pub fn record_cache_result(result: &'static str) {
    ::metrics::counter!("allow_list_cache_total", "result" => result).increment(1);
}

pub fn record_sitemap_section_error(section: &str) {
    ::metrics::counter!("sitemap_section_errors_total", "section" => section.to_string()).increment(1);
}
