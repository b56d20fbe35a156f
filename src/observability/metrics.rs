//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): requests by outcome and host class
//! - `router_request_duration_seconds` (histogram): latency by outcome
//! - `router_lookup_total` (counter): custom domain lookups by result
//! - `router_lookup_cache_total` (counter): lookup cache hits and misses
//! - `router_upstream_errors_total` (counter): forwarding failures by kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter and its scrape listener.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_decision(outcome: &'static str, class: &'static str, start: Instant) {
    metrics::counter!("router_requests_total", "outcome" => outcome, "class" => class).increment(1);
    metrics::histogram!("router_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// `result` is one of `hit`, `miss`, `error`.
pub fn record_lookup(result: &'static str) {
    metrics::counter!("router_lookup_total", "result" => result).increment(1);
}

pub fn record_lookup_cache(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("router_lookup_cache_total", "result" => result).increment(1);
}

/// `kind` is `timeout` or `connect`.
pub fn record_upstream_error(kind: &'static str) {
    metrics::counter!("router_upstream_errors_total", "kind" => kind).increment(1);
}
