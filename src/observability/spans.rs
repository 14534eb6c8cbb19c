//! Structured span definitions for tracing.

use std::time::Instant;

use tracing::{Level, Span, field, span};

use super::metrics::DispatchRoute;

/// Span around one `handle_request` call.
pub struct DispatchSpan {
    span: Span,
    start: Instant,
}

impl DispatchSpan {
    pub fn new(ds_type: &str, ds_name: &str) -> Self {
        let span = span!(
            Level::INFO,
            "query.dispatch",
            ds_type = ds_type,
            ds_name = ds_name,
            route = field::Empty,
            is_error = field::Empty,
            duration_ms = field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
        }
    }

    pub fn record_route(&self, route: DispatchRoute) {
        let route = match route {
            DispatchRoute::Live => "live",
            DispatchRoute::Factory => "factory",
        };
        self.span.record("route", route);
    }

    /// Records the outcome and returns the elapsed time in milliseconds.
    pub fn finish(&self, is_error: bool) -> f64 {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        self.span.record("is_error", is_error);
        self.span.record("duration_ms", elapsed_ms as u64);
        elapsed_ms
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

pub fn reconcile_span(org_id: i64, plugin_id: &str) -> Span {
    span!(
        Level::INFO,
        "dashboards.reconcile",
        org_id = org_id,
        plugin_id = plugin_id,
        rows = field::Empty,
    )
}
