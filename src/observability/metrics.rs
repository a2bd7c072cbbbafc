//! Metrics collection and exposition.
//!
//! # Metrics
//! - `restful_requests_total` (counter): requests by method, status, route
//! - `restful_request_duration_seconds` (histogram): latency distribution
//! - `restful_routes` (gauge): size of the compiled route table
//!
//! # Design Decisions
//! - Route label is the finalized pattern, never the raw path, to keep
//!   label cardinality bounded
//! - Recording is a no-op until an exporter is installed

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("route", route.to_string()),
    ];
    counter!("restful_requests_total", &labels).increment(1);
    histogram!("restful_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

/// Record the number of compiled routes.
pub fn record_route_table(len: usize) {
    gauge!("restful_routes").set(len as f64);
}
