//! Prometheus metrics for the reconciliation engines.
//!
//! The server registers these next to its own HTTP metrics.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Reconciliation
// =============================================================================

/// Reconciliations by service and outcome.
pub static RECONCILIATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "darrlink_reconciliations_total",
            "Total reconciliations by outcome",
        ),
        &["service", "outcome"],
    )
    .unwrap()
});

/// Wall time of one add() call, lookup included.
pub static RECONCILIATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "darrlink_reconciliation_duration_seconds",
            "Duration of a single reconciliation",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service"],
    )
    .unwrap()
});

/// Titles per bulk request.
pub static BULK_BATCH_SIZE: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("darrlink_bulk_batch_size", "Number of titles per bulk request")
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        &["service", "mode"],
    )
    .unwrap()
});

// =============================================================================
// Target services
// =============================================================================

/// Calls made against Radarr/Sonarr.
pub static ARR_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "darrlink_arr_requests_total",
            "Requests sent to target services",
        ),
        &["service", "operation", "status"], // status: HTTP code or "error"
    )
    .unwrap()
});

/// Queue checks that failed and were treated as "not queued".
pub static QUEUE_CHECK_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "darrlink_queue_check_failures_total",
            "Queue status checks that failed open",
        ),
        &["service"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Record one call against a target service.
pub fn record_arr_request(service: &str, operation: &str, status: Option<u16>) {
    let status = status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "error".to_string());
    ARR_REQUESTS_TOTAL
        .with_label_values(&[service, operation, &status])
        .inc();
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(RECONCILIATIONS_TOTAL.clone()),
        Box::new(RECONCILIATION_DURATION.clone()),
        Box::new(BULK_BATCH_SIZE.clone()),
        Box::new(ARR_REQUESTS_TOTAL.clone()),
        Box::new(QUEUE_CHECK_FAILURES.clone()),
    ]
}
