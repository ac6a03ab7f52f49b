//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): responses by surface and status
//! - `gateway_request_duration_seconds` (histogram): latency by surface
//! - `gateway_dispatch_total` (counter): dispatch decisions by outcome
//! - `gateway_config_fetch_total` (counter): remote table fetches by result
//! - `gateway_asset_resolutions_total` (counter): asset lookups by outcome
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Metric names.
pub mod names {
    pub const REQUESTS_TOTAL: &str = "gateway_requests_total";
    pub const REQUEST_DURATION_SECONDS: &str = "gateway_request_duration_seconds";
    pub const DISPATCH_TOTAL: &str = "gateway_dispatch_total";
    pub const CONFIG_FETCH_TOTAL: &str = "gateway_config_fetch_total";
    pub const ASSET_RESOLUTIONS_TOTAL: &str = "gateway_asset_resolutions_total";
}

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install Prometheus exporter"),
    }
}

/// Record one served response.
pub fn record_request(surface: &'static str, status: u16, start: Instant) {
    counter!(
        names::REQUESTS_TOTAL,
        "surface" => surface,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(names::REQUEST_DURATION_SECONDS, "surface" => surface)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_dispatch(outcome: &'static str) {
    counter!(names::DISPATCH_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_config_fetch(result: &'static str) {
    counter!(names::CONFIG_FETCH_TOTAL, "result" => result).increment(1);
}

pub fn record_asset_resolution(outcome: &'static str) {
    counter!(names::ASSET_RESOLUTIONS_TOTAL, "outcome" => outcome).increment(1);
}
