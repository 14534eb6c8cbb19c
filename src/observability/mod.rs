//! Tracing spans and local metrics for the services.
//!
//! Enable the `tracing-init` feature to install an env-filtered subscriber:
//!
//! ```rust,ignore
//! plugin_services::observability::init_tracing();
//! ```

mod metrics;
mod spans;

pub use metrics::{Counter, DispatchRoute, Histogram, MetricsSummary, ServiceMetrics};
pub use spans::{DispatchSpan, reconcile_span};

/// Installs a fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Returns `false` if a global subscriber was already set.
#[cfg(feature = "tracing-init")]
pub fn init_tracing() -> bool {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_ok()
}
