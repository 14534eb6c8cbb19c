//! Atomic metrics for dispatch and reconciliation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe atomic counter.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Simple histogram using fixed buckets.
#[derive(Debug)]
pub struct Histogram {
    buckets: Vec<AtomicU64>,
    bucket_bounds: Vec<f64>,
    sum: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    pub fn new(bucket_bounds: Vec<f64>) -> Self {
        let buckets = (0..=bucket_bounds.len())
            .map(|_| AtomicU64::new(0))
            .collect();
        Self {
            buckets,
            bucket_bounds,
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn default_latency() -> Self {
        Self::new(vec![
            1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0,
        ])
    }

    pub fn observe(&self, value: f64) {
        let bucket_idx = self
            .bucket_bounds
            .iter()
            .position(|&bound| value <= bound)
            .unwrap_or(self.bucket_bounds.len());

        self.buckets[bucket_idx].fetch_add(1, Ordering::Relaxed);
        // scaled by 1000 to keep sub-millisecond precision
        self.sum
            .fetch_add((value * 1000.0) as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn bucket_counts(&self) -> Vec<u64> {
        self.buckets
            .iter()
            .map(|b| b.load(Ordering::Relaxed))
            .collect()
    }

    pub fn sum_ms(&self) -> f64 {
        self.sum.load(Ordering::Relaxed) as f64 / 1000.0
    }

    pub fn mean_ms(&self) -> f64 {
        match self.count() {
            0 => 0.0,
            n => self.sum_ms() / n as f64,
        }
    }
}

/// How a dispatched query found its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchRoute {
    Live,
    Factory,
}

/// Shared by the dashboard and data services.
#[derive(Debug)]
pub struct ServiceMetrics {
    pub dispatch_live: Counter,
    pub dispatch_factory: Counter,
    pub dispatch_unknown_type: Counter,
    pub dispatch_instantiation_failures: Counter,
    pub dispatch_errors: Counter,
    pub dispatch_latency_ms: Histogram,
    pub reconciliations: Counter,
    pub reconciliation_failures: Counter,
    pub dashboards_removed: Counter,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            dispatch_live: Counter::new(),
            dispatch_factory: Counter::new(),
            dispatch_unknown_type: Counter::new(),
            dispatch_instantiation_failures: Counter::new(),
            dispatch_errors: Counter::new(),
            dispatch_latency_ms: Histogram::default_latency(),
            reconciliations: Counter::new(),
            reconciliation_failures: Counter::new(),
            dashboards_removed: Counter::new(),
        }
    }

    pub fn record_route(&self, route: DispatchRoute) {
        match route {
            DispatchRoute::Live => self.dispatch_live.inc(),
            DispatchRoute::Factory => self.dispatch_factory.inc(),
        }
    }

    pub fn record_dispatch_end(&self, success: bool, latency_ms: f64) {
        self.dispatch_latency_ms.observe(latency_ms);
        if !success {
            self.dispatch_errors.inc();
        }
    }

    pub fn record_reconciliation(&self, result: Result<usize, ()>) {
        self.reconciliations.inc();
        match result {
            Ok(removed) => self.dashboards_removed.add(removed as u64),
            Err(()) => self.reconciliation_failures.inc(),
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            live_dispatches: self.dispatch_live.get(),
            factory_dispatches: self.dispatch_factory.get(),
            unknown_types: self.dispatch_unknown_type.get(),
            instantiation_failures: self.dispatch_instantiation_failures.get(),
            dispatch_errors: self.dispatch_errors.get(),
            avg_dispatch_latency_ms: self.dispatch_latency_ms.mean_ms(),
            reconciliations: self.reconciliations.get(),
            reconciliation_failures: self.reconciliation_failures.get(),
            dashboards_removed: self.dashboards_removed.get(),
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSummary {
    pub live_dispatches: u64,
    pub factory_dispatches: u64,
    pub unknown_types: u64,
    pub instantiation_failures: u64,
    pub dispatch_errors: u64,
    pub avg_dispatch_latency_ms: f64,
    pub reconciliations: u64,
    pub reconciliation_failures: u64,
    pub dashboards_removed: u64,
}
