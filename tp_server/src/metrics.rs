//! Prometheus metrics for the points server.
//!
//! Metrics are exposed in Prometheus text format on a separate listener when
//! `METRICS_BIND` is configured. Without an installed exporter every
//! recording call is a no-op.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tp_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::operations_total("join", "ok");
//! metrics::points_moved_total("fund", 300);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Ledger Metrics
// ============================================================================

/// Count one engine operation by outcome (`ok` or an error kind).
pub fn operations_total(operation: &str, outcome: &str) {
    metrics::counter!("points_operations_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Points credited or debited by a successful operation.
pub fn points_moved_total(operation: &str, points: i64) {
    metrics::counter!("points_moved_total",
        "operation" => operation.to_string()
    )
    .increment(points.unsigned_abs());
}

/// Record a settled prize.
pub fn prize_points(prize: i64) {
    metrics::histogram!("tournament_prize_points").record(prize as f64);
}
