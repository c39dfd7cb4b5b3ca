//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by outcome
//! - `gateway_request_duration_seconds` (histogram): time to commit, by outcome
//! - `gateway_late_results_total` (counter): invocations that settled after
//!   their deadline and were discarded
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);

    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one committed request.
pub fn record_request(outcome: &'static str, elapsed: Duration) {
    metrics::counter!("gateway_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "outcome" => outcome)
        .record(elapsed.as_secs_f64());
}

/// Record an invocation that finished after its response was committed.
pub fn record_late_result() {
    metrics::counter!("gateway_late_results_total").increment(1);
}
