use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static CRUD_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "library_crud_operations_total",
        "CRUD operations executed against the database",
        &["entity", "op"]
    )
    .expect("register crud_operations_total")
});

pub static UPSTREAM_REQUESTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "admin_upstream_requests_total",
        "Total requests sent by the admin to proxied services"
    )
    .expect("register upstream_requests_total")
});

pub static UPSTREAM_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "admin_upstream_errors_total",
        "Admin requests to proxied services that failed or returned an error status"
    )
    .expect("register upstream_errors_total")
});

pub static FORM_VALIDATION_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "admin_form_validation_failures_total",
        "Admin form submissions rejected by validation"
    )
    .expect("register form_validation_failures_total")
});

pub fn record_crud(entity: &str, op: &str) {
    CRUD_OPERATIONS_TOTAL.with_label_values(&[entity, op]).inc();
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

/// Axum handler for `GET /metrics`.
pub async fn metrics_handler() -> (axum::http::StatusCode, String) {
    encode_metrics()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_metrics_contain_touched_counters() {
        record_crud("book", "create");
        UPSTREAM_REQUESTS_TOTAL.inc();
        let (status, body) = encode_metrics();
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(body.contains("library_crud_operations_total"));
        assert!(body.contains("admin_upstream_requests_total"));
    }
}
