//! # Metrics
//!
//! Prometheus metrics for reconciliation runs.
//!
//! ## Metrics Exposed
//!
//! - `s3_file_resource_reconciliations_total` - Reconciliations by ensure state and outcome
//! - `s3_file_resource_reconciliation_errors_total` - Failed reconciliations by error kind
//! - `s3_file_resource_reconciliation_duration_seconds` - Duration of reconciliations
//! - `s3_file_resource_fetches_total` - Objects downloaded from the store
//! - `s3_file_resource_fetched_bytes_total` - Bytes written by downloads
//! - `s3_file_resource_digest_checks_total` - Local digest comparisons by result
//!
//! The statics record even when [`register_metrics`] was never called; only
//! [`gather_text`] output depends on registration.

use anyhow::Result;
use prometheus::{Encoder, Histogram, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "s3_file_resource_reconciliations_total",
            "Total number of reconciliations by ensure state and outcome",
        ),
        &["ensure", "outcome"],
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "s3_file_resource_reconciliation_errors_total",
            "Total number of failed reconciliations by error kind",
        ),
        &["kind"],
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "s3_file_resource_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static FETCHES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "s3_file_resource_fetches_total",
        "Total number of objects downloaded",
    )
    .expect("Failed to create FETCHES_TOTAL metric - this should never happen")
});

static FETCHED_BYTES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "s3_file_resource_fetched_bytes_total",
        "Total number of bytes written by downloads",
    )
    .expect("Failed to create FETCHED_BYTES_TOTAL metric - this should never happen")
});

static DIGEST_CHECKS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "s3_file_resource_digest_checks_total",
            "Total number of local digest comparisons by result",
        ),
        &["result"],
    )
    .expect("Failed to create DIGEST_CHECKS_TOTAL metric - this should never happen")
});

pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(FETCHES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(FETCHED_BYTES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DIGEST_CHECKS_TOTAL.clone()))?;

    Ok(())
}

pub fn record_reconciliation(ensure: &str, outcome: &str, duration: f64) {
    RECONCILIATIONS_TOTAL
        .with_label_values(&[ensure, outcome])
        .inc();
    RECONCILIATION_DURATION.observe(duration);
}

pub fn increment_reconciliation_errors(kind: &str) {
    RECONCILIATION_ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

pub fn record_fetch(bytes: u64) {
    FETCHES_TOTAL.inc();
    FETCHED_BYTES_TOTAL.inc_by(bytes);
}

pub fn record_digest_check(in_sync: bool) {
    let result = if in_sync { "match" } else { "mismatch" };
    DIGEST_CHECKS_TOTAL.with_label_values(&[result]).inc();
}

/// Registered metrics in the Prometheus text exposition format
pub fn gather_text() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_counters_accumulate() {
        let fetches = FETCHES_TOTAL.get();
        let bytes = FETCHED_BYTES_TOTAL.get();

        record_fetch(42);

        assert!(FETCHES_TOTAL.get() > fetches);
        assert!(FETCHED_BYTES_TOTAL.get() >= bytes + 42);
    }

    #[test]
    fn test_reconciliation_labels() {
        let counter = RECONCILIATIONS_TOTAL.with_label_values(&["latest", "unchanged"]);
        let before = counter.get();

        record_reconciliation("latest", "unchanged", 0.01);

        assert!(counter.get() > before);
    }

    #[test]
    fn test_gather_text_after_registration() {
        // Other tests in this binary never register, so only this call does.
        register_metrics().unwrap();
        record_digest_check(true);

        let text = gather_text().unwrap();
        assert!(text.contains("s3_file_resource_digest_checks_total"));
        assert!(text.contains("result=\"match\""));
    }
}
