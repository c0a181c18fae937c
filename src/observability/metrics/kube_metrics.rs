//! # Kubernetes API Metrics
//!
//! Request counts and latency against the API server, and RBAC resolution
//! anomalies.

use crate::observability::metrics::registry::REGISTRY;
use anyhow::Result;
use prometheus::{HistogramVec, IntCounter, IntCounterVec};
use std::sync::LazyLock;

static KUBE_REQUESTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "rbac_manager_kube_requests_total",
            "Total number of Kubernetes API requests",
        ),
        &["method", "outcome"],
    )
    .expect("Failed to create KUBE_REQUESTS_TOTAL metric - this should never happen")
});

static KUBE_REQUEST_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "rbac_manager_kube_request_duration_seconds",
            "Duration of Kubernetes API requests in seconds",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method"],
    )
    .expect("Failed to create KUBE_REQUEST_DURATION metric - this should never happen")
});

static DANGLING_ROLE_REFS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "rbac_manager_dangling_role_refs_total",
        "Bindings skipped because the referenced role does not exist",
    )
    .expect("Failed to create DANGLING_ROLE_REFS_TOTAL metric - this should never happen")
});

/// Register Kubernetes API metrics with the registry
pub(crate) fn register_kube_metrics() -> Result<()> {
    REGISTRY.register(Box::new(KUBE_REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(KUBE_REQUEST_DURATION.clone()))?;
    REGISTRY.register(Box::new(DANGLING_ROLE_REFS_TOTAL.clone()))?;
    Ok(())
}

pub fn observe_kube_request(method: &str, outcome: &str, duration: f64) {
    KUBE_REQUESTS_TOTAL
        .with_label_values(&[method, outcome])
        .inc();
    KUBE_REQUEST_DURATION
        .with_label_values(&[method])
        .observe(duration);
}

pub fn increment_dangling_role_refs() {
    DANGLING_ROLE_REFS_TOTAL.inc();
}
