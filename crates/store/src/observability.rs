use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter, IntCounterVec};

use crate::operation::OperationKind;

// Prometheus metrics (default registry)
pub static OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "kv_operations_total",
        "Operations processed by the store owner",
        &["kind", "outcome"]
    )
    .expect("register operations_total")
});

pub static OPERATION_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "kv_operation_duration_seconds",
        "Round trip from gateway send to owner reply",
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
    )
    .expect("register operation_duration")
});

pub static STORE_UNAVAILABLE_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "kv_store_unavailable_total",
        "Gateway calls made after the owner was gone"
    )
    .expect("register store_unavailable_total")
});

pub static OWNER_TIMEOUTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "kv_owner_timeouts_total",
        "Gateway calls that hit the request deadline"
    )
    .expect("register owner_timeouts_total")
});

pub fn record_outcome(kind: OperationKind, success: bool) {
    let outcome = if success { "ok" } else { "not_found" };
    OPERATIONS_TOTAL.with_label_values(&[kind.as_str(), outcome]).inc();
}

/// Force registration so `/metrics` lists every series from the first scrape.
pub fn init() {
    Lazy::force(&OPERATIONS_TOTAL);
    Lazy::force(&OPERATION_DURATION);
    Lazy::force(&STORE_UNAVAILABLE_TOTAL);
    Lazy::force(&OWNER_TIMEOUTS_TOTAL);
}
