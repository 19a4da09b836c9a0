//! Metrics collection and exposition.
//!
//! # Metrics
//! - `greeting_requests_total` (counter): greetings served, by route
//! - `greeting_registry_names` (gauge): distinct names with an assigned id
//! - `replay_passes_total` (counter): replay passes, by outcome
//! - `replay_captured_bytes` (histogram): body bytes discarded per pass
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_greeting(route: &str) {
    metrics::counter!("greeting_requests_total", "route" => route.to_string()).increment(1);
}

pub fn record_registry_size(size: usize) {
    metrics::gauge!("greeting_registry_names").set(size as f64);
}

pub fn record_replay_pass(succeeded: bool, captured_bytes: usize) {
    let outcome = if succeeded { "ok" } else { "error" };
    metrics::counter!("replay_passes_total", "outcome" => outcome).increment(1);
    metrics::histogram!("replay_captured_bytes").record(captured_bytes as f64);
}
