// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the update gateway.
//!
//! All metrics carry the `ddnsgate_` prefix and are exposed on `/metrics`.
//!
//! # Metrics Categories
//!
//! - **Update Metrics** - Submitted updates by operation, record type and outcome
//! - **Validation Metrics** - Requests rejected before anything was sent
//! - **Performance Metrics** - Round-trip duration of submitted updates
//!
//! # Example
//!
//! ```rust,no_run
//! use ddnsgate::metrics::record_update;
//!
//! record_update("add", "A", "acked", std::time::Duration::from_millis(12));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all gateway metrics
const METRICS_NAMESPACE: &str = "ddnsgate";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Update Metrics
// ============================================================================

/// Total number of submitted updates
///
/// Labels:
/// - `operation`: `add` or `delete`
/// - `record_type`: Record type (e.g., `A`, `TXT`)
/// - `outcome`: Terminal state (`acked`, `rejected`, `timed_out`, `connection_failed`)
pub static UPDATES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_updates_total"),
        "Total number of submitted updates by operation, record type and outcome",
    );
    let counter = CounterVec::new(opts, &["operation", "record_type", "outcome"])
        .expect("updates_total metric definition is valid");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("updates_total is registered once");
    counter
});

/// Round-trip duration of submitted updates in seconds
///
/// Labels:
/// - `operation`: `add` or `delete`
pub static UPDATE_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_update_duration_seconds"),
        "Duration of submitted updates in seconds by operation",
    )
    .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]);
    let histogram = HistogramVec::new(opts, &["operation"])
        .expect("update_duration_seconds metric definition is valid");
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("update_duration_seconds is registered once");
    histogram
});

// ============================================================================
// Validation Metrics
// ============================================================================

/// Total number of requests rejected by validation
///
/// Labels:
/// - `reason`: Reason code (e.g., `InvalidName`, `InvalidValue`)
pub static VALIDATION_FAILURES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_validation_failures_total"),
        "Total number of requests rejected by validation by reason",
    );
    let counter = CounterVec::new(opts, &["reason"])
        .expect("validation_failures_total metric definition is valid");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("validation_failures_total is registered once");
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a submitted update
///
/// # Arguments
/// * `operation` - `add` or `delete`
/// * `record_type` - Record type of the update
/// * `outcome` - Terminal state of the submit call
/// * `duration` - Time spent in the transport
pub fn record_update(operation: &str, record_type: &str, outcome: &str, duration: Duration) {
    UPDATES_TOTAL
        .with_label_values(&[operation, record_type, outcome])
        .inc();
    UPDATE_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
}

/// Record a request rejected before submission
///
/// # Arguments
/// * `reason` - Reason code of the validation error
pub fn record_validation_failure(reason: &str) {
    VALIDATION_FAILURES_TOTAL.with_label_values(&[reason]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_update() {
        record_update("add", "SRV", "acked", Duration::from_millis(20));

        let counter = UPDATES_TOTAL.with_label_values(&["add", "SRV", "acked"]);
        assert!(counter.get() > 0.0);

        let histogram = UPDATE_DURATION_SECONDS.with_label_values(&["add"]);
        assert!(histogram.get_sample_count() > 0);
    }

    #[test]
    fn test_record_validation_failure() {
        let before = VALIDATION_FAILURES_TOTAL
            .with_label_values(&["TestReason"])
            .get();
        record_validation_failure("TestReason");
        let after = VALIDATION_FAILURES_TOTAL
            .with_label_values(&["TestReason"])
            .get();
        assert!(after > before);
    }

    #[test]
    fn test_gather_metrics() {
        record_update("delete", "PTR", "timed_out", Duration::from_secs(5));

        let output = gather_metrics().unwrap();
        assert!(output.contains("ddnsgate_updates_total"));
        assert!(output.contains("ddnsgate_update_duration_seconds"));
        assert!(output.contains("outcome=\"timed_out\""));
    }
}
