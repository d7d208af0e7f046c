//! Structured logging configuration.
//!
//! The library crate logs through the `log` facade; the subscriber installed
//! here bridges those records into `tracing` so both end up in one stream.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
///
/// # Example
///
/// ```no_run
/// use authkeep_server::logging;
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
        .with_file(true)
        .with_line_number(true);

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
    {
        tracing::info!("Structured logging initialized");
    }
}

/// Log security event with structured data
///
/// # Arguments
///
/// * `event_type` - Type of security event (`failed_login`, `refresh_rejected`, ...)
/// * `email` - Email the request claimed, if any
/// * `request_id` - Correlation id of the request
/// * `message` - Event message
///
/// # Example
///
/// ```
/// use authkeep_server::logging::log_security_event;
///
/// log_security_event(
///     "failed_login",
///     Some("a@x.com"),
///     Some("5f0c6d1e-8a52-4a7e-9c4f-1f1a2b3c4d5e"),
///     "Invalid credentials",
/// );
/// ```
pub fn log_security_event(
    event_type: &str,
    email: Option<&str>,
    request_id: Option<&str>,
    message: &str,
) {
    tracing::warn!(
        event_type = event_type,
        email = email,
        request_id = request_id,
        "SECURITY: {}",
        message
    );
}

/// Log performance metric
///
/// Operations slower than one second are logged at warn level.
pub fn log_performance(operation: &str, duration_ms: u64, metadata: Option<&str>) {
    if duration_ms > 1000 {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            metadata = metadata,
            "PERFORMANCE: Slow operation"
        );
    } else {
        tracing::debug!(
            operation = operation,
            duration_ms = duration_ms,
            metadata = metadata,
            "Performance metric"
        );
    }
}
