//! Metrics collection and exposition.
//!
//! # Metrics
//! - `wallet_submissions_total` (counter): submissions by result
//! - `wallet_confirmations_total` (counter): poll outcomes by kind
//! - `wallet_confirmation_rounds` (histogram): round-advance waits per poll
//! - `wallet_node_health` (gauge): 1=reachable, 0=unreachable

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the result of a submission ("accepted", "rejected", "unavailable").
pub fn record_submission(result: &'static str) {
    metrics::counter!("wallet_submissions_total", "result" => result).increment(1);
}

/// Record a finished confirmation poll.
pub fn record_confirmation(outcome: &'static str, rounds_waited: u64) {
    metrics::counter!("wallet_confirmations_total", "outcome" => outcome).increment(1);
    metrics::histogram!("wallet_confirmation_rounds").record(rounds_waited as f64);
}

/// Record whether a node endpoint answered a status query.
pub fn record_node_health(endpoint: &str, healthy: bool) {
    metrics::gauge!("wallet_node_health", "endpoint" => endpoint.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
