//! Structured logging configuration.
//!
//! The core library logs through the `log` facade; those records are bridged
//! into the `tracing` subscriber installed here, so one `RUST_LOG` filter
//! governs both.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Initialize structured logging
///
/// # Example
///
/// ```no_run
/// use tp_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a points operation the engine refused
///
/// Client errors are logged at `info`, store failures at `error`.
///
/// # Example
///
/// ```
/// use tp_server::logging::log_rejected_operation;
///
/// log_rejected_operation("join", "insufficient_funds", 400, "balance 50, fee 100");
/// ```
pub fn log_rejected_operation(operation: &str, kind: &str, status_code: u16, message: &str) {
    if status_code >= 500 {
        tracing::error!(
            operation = operation,
            error_kind = kind,
            http_status = status_code,
            "Operation failed: {}",
            message
        );
    } else {
        tracing::info!(
            operation = operation,
            error_kind = kind,
            http_status = status_code,
            "Operation rejected: {}",
            message
        );
    }
}

/// Log API request/response
///
/// Requests slower than one second are logged at `warn`.
pub fn log_api_request(method: &str, path: &str, status_code: u16, duration_ms: u64) {
    if duration_ms > 1000 {
        tracing::warn!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "Slow API request"
        );
    } else {
        tracing::debug!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request completed"
        );
    }
}
