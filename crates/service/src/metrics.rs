use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static ISSUE_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "issue_tracker_operations_total",
        "Issue operations by kind and outcome",
        &["op", "outcome"]
    )
    .expect("register issue_tracker_operations_total")
});

/// Count one operation. `outcome` is `ok` or an error kind.
pub fn record(op: &str, outcome: &str) {
    ISSUE_OPERATIONS_TOTAL.with_label_values(&[op, outcome]).inc();
}

/// Render the default registry in Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    Lazy::force(&ISSUE_OPERATIONS_TOTAL);
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_operations_show_up_in_exposition() {
        let before = ISSUE_OPERATIONS_TOTAL.with_label_values(&["delete", "delete_failed"]).get();
        record("delete", "delete_failed");
        let after = ISSUE_OPERATIONS_TOTAL.with_label_values(&["delete", "delete_failed"]).get();
        assert_eq!(after, before + 1);

        let text = encode_metrics().unwrap();
        assert!(text.contains("issue_tracker_operations_total"));
    }
}
