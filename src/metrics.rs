// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the infrastructure manager.
//!
//! All metric names carry the `im_` prefix.
//!
//! # Metrics Categories
//!
//! - **State Metrics** - Current state of every `GardenerCluster` and `Runtime`
//! - **Kubeconfig Metrics** - Expiration time of the kubeconfig stored per cluster
//! - **Reconciliation Metrics** - Outcome and duration of reconciliations
//! - **Error Metrics** - Errors by resource type and category
//!
//! # Example
//!
//! ```rust,no_run
//! use infrastructure_manager::metrics::record_reconciliation_success;
//!
//! record_reconciliation_success("Runtime", std::time::Duration::from_secs(1));
//! ```

use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Prefix for all infrastructure manager metrics
const METRICS_NAMESPACE: &str = "im";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// State Metrics
// ============================================================================

/// Current state of each `GardenerCluster` (always 1)
///
/// Labels: `shootName`, `runtimeId`, `state`, `reason`
pub static GARDENER_CLUSTERS_STATE: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_gardener_clusters_state"),
        "Current state of each GardenerCluster",
    );
    let gauge = GaugeVec::new(opts, &["shootName", "runtimeId", "state", "reason"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Expiration of the kubeconfig stored for each cluster, in unix seconds
///
/// Labels: `shootName`, `runtimeId`
pub static KUBECONFIG_EXPIRATION: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_kubeconfig_expiration"),
        "Unix time at which the stored kubeconfig expires",
    );
    let gauge = GaugeVec::new(opts, &["shootName", "runtimeId"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Current state of each `Runtime` (always 1)
///
/// Labels: `runtimeId`, `shootName`, `state`
pub static RUNTIME_STATE: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_runtime_state"),
        "Current state of each Runtime",
    );
    let gauge = GaugeVec::new(opts, &["runtimeId", "shootName", "state"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Label values last published per runtime id, so a state change replaces the old series.
static CLUSTER_STATE_LABELS: LazyLock<Mutex<HashMap<String, [String; 4]>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

static RUNTIME_STATE_LABELS: LazyLock<Mutex<HashMap<String, [String; 3]>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliations by resource type and status
///
/// Labels:
/// - `resource_type`: Kind of resource (`Runtime`, `GardenerCluster`)
/// - `status`: Outcome (`success`, `error`, `requeue`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of reconciliations by resource type and status",
    );
    let counter = CounterVec::new(opts, &["resource_type", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliations in seconds
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliations in seconds by resource type",
    )
    .buckets(vec![0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]);
    let histogram = HistogramVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Total number of requeue operations
///
/// Labels:
/// - `resource_type`: Kind of resource
/// - `reason`: Reason for requeue (`error`, `waiting`, `rotation`)
pub static REQUEUE_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_requeues_total"),
        "Total number of requeue operations by resource type and reason",
    );
    let counter = CounterVec::new(opts, &["resource_type", "reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of FSM state transitions
///
/// Labels:
/// - `state`: State that was left
/// - `next`: State that was entered, or `done`
pub static FSM_TRANSITIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_fsm_transitions_total"),
        "Total number of Runtime state machine transitions",
    );
    let counter = CounterVec::new(opts, &["state", "next"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Resource Lifecycle Metrics
// ============================================================================

/// Total number of resources created by kind (`Shoot`, `Secret`, ...)
pub static RESOURCES_CREATED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resources_created_total"),
        "Total number of resources created by type",
    );
    let counter = CounterVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of resources deleted by kind
pub static RESOURCES_DELETED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resources_deleted_total"),
        "Total number of resources deleted by type",
    );
    let counter = CounterVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of errors by resource type and error category
///
/// Labels:
/// - `resource_type`: Kind of resource
/// - `error_type`: Category of error (`conversion`, `gardener`, `api`, `timeout`)
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of errors by resource type and error category",
    );
    let counter = CounterVec::new(opts, &["resource_type", "error_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Publish the state of a `GardenerCluster`, replacing any previous series.
pub fn set_gardener_cluster_state(runtime_id: &str, shoot_name: &str, state: &str, reason: &str) {
    let labels = [
        shoot_name.to_string(),
        runtime_id.to_string(),
        state.to_string(),
        reason.to_string(),
    ];
    let mut published = CLUSTER_STATE_LABELS
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    if let Some(previous) = published.insert(runtime_id.to_string(), labels.clone()) {
        if previous != labels {
            let values: Vec<&str> = previous.iter().map(String::as_str).collect();
            let _ = GARDENER_CLUSTERS_STATE.remove_label_values(&values);
        }
    }
    let values: Vec<&str> = labels.iter().map(String::as_str).collect();
    GARDENER_CLUSTERS_STATE.with_label_values(&values).set(1.0);
}

/// Record the expiration of a freshly stored kubeconfig.
pub fn set_kubeconfig_expiration(runtime_id: &str, shoot_name: &str, expires_at_unix: i64) {
    #[allow(clippy::cast_precision_loss)]
    KUBECONFIG_EXPIRATION
        .with_label_values(&[shoot_name, runtime_id])
        .set(expires_at_unix as f64);
}

/// Drop the kubeconfig expiration series of a cluster.
pub fn clear_kubeconfig_expiration(runtime_id: &str, shoot_name: &str) {
    let _ = KUBECONFIG_EXPIRATION.remove_label_values(&[shoot_name, runtime_id]);
}

/// Drop every series published for a deleted `GardenerCluster`.
pub fn clear_gardener_cluster(runtime_id: &str, shoot_name: &str) {
    let mut published = CLUSTER_STATE_LABELS
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    if let Some(previous) = published.remove(runtime_id) {
        let values: Vec<&str> = previous.iter().map(String::as_str).collect();
        let _ = GARDENER_CLUSTERS_STATE.remove_label_values(&values);
    }
    clear_kubeconfig_expiration(runtime_id, shoot_name);
}

/// Publish the state of a `Runtime`, replacing any previous series.
pub fn set_runtime_state(runtime_id: &str, shoot_name: &str, state: &str) {
    let labels = [
        runtime_id.to_string(),
        shoot_name.to_string(),
        state.to_string(),
    ];
    let mut published = RUNTIME_STATE_LABELS
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    if let Some(previous) = published.insert(runtime_id.to_string(), labels.clone()) {
        if previous != labels {
            let values: Vec<&str> = previous.iter().map(String::as_str).collect();
            let _ = RUNTIME_STATE.remove_label_values(&values);
        }
    }
    let values: Vec<&str> = labels.iter().map(String::as_str).collect();
    RUNTIME_STATE.with_label_values(&values).set(1.0);
}

/// Drop the state series of a deleted `Runtime`.
pub fn clear_runtime_state(runtime_id: &str) {
    let mut published = RUNTIME_STATE_LABELS
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    if let Some(previous) = published.remove(runtime_id) {
        let values: Vec<&str> = previous.iter().map(String::as_str).collect();
        let _ = RUNTIME_STATE.remove_label_values(&values);
    }
}

/// Record a successful reconciliation
pub fn record_reconciliation_success(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "success"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconciliation
pub fn record_reconciliation_error(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "error"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a reconciliation requeue
pub fn record_reconciliation_requeue(resource_type: &str, reason: &str) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "requeue"])
        .inc();
    REQUEUE_TOTAL
        .with_label_values(&[resource_type, reason])
        .inc();
}

/// Record a state machine transition
pub fn record_fsm_transition(state: &str, next: &str) {
    FSM_TRANSITIONS_TOTAL
        .with_label_values(&[state, next])
        .inc();
}

/// Record resource creation
pub fn record_resource_created(resource_type: &str) {
    RESOURCES_CREATED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

/// Record resource deletion
pub fn record_resource_deleted(resource_type: &str) {
    RESOURCES_DELETED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

/// Record an error
pub fn record_error(resource_type: &str, error_type: &str) {
    ERRORS_TOTAL
        .with_label_values(&[resource_type, error_type])
        .inc();
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
#[path = "metrics_tests.rs"]
mod metrics_tests;
