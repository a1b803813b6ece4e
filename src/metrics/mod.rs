// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::configure_routes;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order operations by outcome (ok, not_found, already_done, ...)
// - Order operation latency
// - Items attached to orders
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the order service
pub struct Metrics {
    registry: Registry,

    pub order_operations: IntCounterVec,
    pub order_operation_duration: HistogramVec,
    pub order_items_attached: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let order_operations = IntCounterVec::new(
            Opts::new("order_operations_total", "Total order operations by outcome"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(order_operations.clone()))?;

        let order_operation_duration = HistogramVec::new(
            HistogramOpts::new("order_operation_duration_seconds", "Order operation duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(order_operation_duration.clone()))?;

        let order_items_attached = IntCounter::new(
            "order_items_attached_total",
            "Total catalog items attached to orders",
        )?;
        registry.register(Box::new(order_items_attached.clone()))?;

        Ok(Self {
            registry,
            order_operations,
            order_operation_duration,
            order_items_attached,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record one finished order operation
    pub fn record_operation(&self, operation: &str, outcome: &str, duration_secs: f64) {
        self.order_operations.with_label_values(&[operation, outcome]).inc();
        self.order_operation_duration
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    /// Helper to count items attached by a committed operation
    pub fn record_items_attached(&self, count: usize) {
        self.order_items_attached.inc_by(count as u64);
    }
}
