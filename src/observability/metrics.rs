//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `sealed_age_reconciliations_total` - Total number of reconciliations
//! - `sealed_age_reconciliation_errors_total` - Total number of reconciliation errors
//! - `sealed_age_reconciliation_duration_seconds` - Duration of reconciliation operations
//! - `sealed_age_decryptions_total` - Total number of field decryptions
//! - `sealed_age_decryption_errors_total` - Field decryptions where no key succeeded
//! - `sealed_age_decryption_duration_seconds` - Duration of field decryptions
//! - `sealed_age_key_attempts_total{outcome}` - Per-key decryption attempts
//! - `sealed_age_secrets_written_total{operation}` - Derived Secret creates and updates
//! - `sealed_age_status_write_failures_total` - Best-effort status writes that failed
//! - `sealed_age_requeues_total{reason}` - Requeues scheduled by the controller
//! - `sealed_age_key_pool_size` - Keys found in the pool on the last resolution

use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec, IntGauge, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "sealed_age_reconciliations_total",
        "Total number of reconciliations",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "sealed_age_reconciliation_errors_total",
        "Total number of reconciliation errors",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "sealed_age_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static DECRYPTIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "sealed_age_decryptions_total",
        "Total number of successful field decryptions",
    )
    .expect("Failed to create DECRYPTIONS_TOTAL metric - this should never happen")
});

static DECRYPTION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "sealed_age_decryption_errors_total",
        "Total number of field decryptions where no key succeeded",
    )
    .expect("Failed to create DECRYPTION_ERRORS_TOTAL metric - this should never happen")
});

static DECRYPTION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "sealed_age_decryption_duration_seconds",
            "Duration of field decryption in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
    )
    .expect("Failed to create DECRYPTION_DURATION metric - this should never happen")
});

static KEY_ATTEMPTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "sealed_age_key_attempts_total",
            "Per-key decryption attempts by outcome",
        ),
        &["outcome"],
    )
    .expect("Failed to create KEY_ATTEMPTS_TOTAL metric - this should never happen")
});

static SECRETS_WRITTEN_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "sealed_age_secrets_written_total",
            "Derived Secrets written by operation",
        ),
        &["operation"],
    )
    .expect("Failed to create SECRETS_WRITTEN_TOTAL metric - this should never happen")
});

static STATUS_WRITE_FAILURES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "sealed_age_status_write_failures_total",
        "Total number of failed status writes",
    )
    .expect("Failed to create STATUS_WRITE_FAILURES_TOTAL metric - this should never happen")
});

static REQUEUES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new("sealed_age_requeues_total", "Requeues by reason"),
        &["reason"],
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

static KEY_POOL_SIZE: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "sealed_age_key_pool_size",
        "Number of keys found in the key pool on the last resolution",
    )
    .expect("Failed to create KEY_POOL_SIZE metric - this should never happen")
});

/// Register all metrics with the registry.
///
/// Call once at startup; a second call fails with `AlreadyReg`.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(DECRYPTIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DECRYPTION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DECRYPTION_DURATION.clone()))?;
    REGISTRY.register(Box::new(KEY_ATTEMPTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SECRETS_WRITTEN_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STATUS_WRITE_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REQUEUES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(KEY_POOL_SIZE.clone()))?;
    Ok(())
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn increment_decryptions() {
    DECRYPTIONS_TOTAL.inc();
}

pub fn increment_decryption_errors() {
    DECRYPTION_ERRORS_TOTAL.inc();
}

pub fn observe_decryption_duration(duration: f64) {
    DECRYPTION_DURATION.observe(duration);
}

/// Outcome is one of `succeeded`, `failed`, `skipped_missing_key`, `skipped_invalid_key`
pub fn increment_key_attempts(outcome: &str) {
    KEY_ATTEMPTS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Operation is `create` or `update`
pub fn increment_secrets_written(operation: &str) {
    SECRETS_WRITTEN_TOTAL.with_label_values(&[operation]).inc();
}

pub fn increment_status_write_failures() {
    STATUS_WRITE_FAILURES_TOTAL.inc();
}

pub fn increment_requeues(reason: &str) {
    REQUEUES_TOTAL.with_label_values(&[reason]).inc();
}

pub fn set_key_pool_size(count: usize) {
    KEY_POOL_SIZE.set(i64::try_from(count).unwrap_or(i64::MAX));
}
