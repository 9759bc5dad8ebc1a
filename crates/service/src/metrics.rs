use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static LIST_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "shopping_list_operations_total",
        "Shopping list operations handled, by operation",
        &["op"]
    )
    .expect("register shopping_list_operations_total")
});

pub static STORAGE_DEGRADED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "shopping_list_storage_degraded_total",
        "Remote store failures masked by the in-process copy, by event",
        &["event"]
    )
    .expect("register shopping_list_storage_degraded_total")
});

pub fn record_operation(op: &str) {
    LIST_OPERATIONS_TOTAL.with_label_values(&[op]).inc();
}

/// Render the default registry in the Prometheus text format.
pub fn encode_metrics() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("metrics encode error: {e}"))?;
    String::from_utf8(buffer).map_err(|e| format!("metrics encode error: {e}"))
}
