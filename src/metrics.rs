//! Prometheus metrics
//!
//! - Pool occupancy gauges (total / occupied slots)
//! - Operation counters by outcome

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Once;
use tracing::{error, info};

lazy_static::lazy_static! {
    /// Global metrics registry
    pub static ref METRICS_REGISTRY: Registry = Registry::new();

    pub static ref TOTAL_SLOTS: IntGauge = IntGauge::new(
        "carpark_total_slots",
        "Number of slots in the pool"
    ).unwrap();

    pub static ref OCCUPIED_SLOTS: IntGauge = IntGauge::new(
        "carpark_occupied_slots",
        "Number of occupied slots"
    ).unwrap();

    pub static ref OPERATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("carpark_operations_total", "Pool operations by outcome"),
        &["operation", "status"]
    ).unwrap();
}

static INIT: Once = Once::new();

/// Register all metrics with the global registry (idempotent)
pub fn init_metrics() {
    INIT.call_once(|| {
        info!("Initializing Prometheus metrics");
        METRICS_REGISTRY.register(Box::new(TOTAL_SLOTS.clone())).ok();
        METRICS_REGISTRY.register(Box::new(OCCUPIED_SLOTS.clone())).ok();
        METRICS_REGISTRY.register(Box::new(OPERATIONS_TOTAL.clone())).ok();
    });
}

/// Count one operation; `status` is `ok` or an error kind
pub fn record_operation(operation: &str, status: &str) {
    OPERATIONS_TOTAL.with_label_values(&[operation, status]).inc();
}

/// Publish the current pool occupancy
pub fn update_occupancy(total: u32, occupied: u32) {
    TOTAL_SLOTS.set(i64::from(total));
    OCCUPIED_SLOTS.set(i64::from(occupied));
}

/// Render all registered metrics in the Prometheus text format
pub fn export_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}
