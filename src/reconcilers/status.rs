// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers for `Runtime` and `GardenerCluster`.
//!
//! Conditions follow the Kubernetes conventions:
//! - `type`: The aspect of the resource being reported (e.g., "Provisioned", "Ready")
//! - `status`: "True", "False", or "Unknown"
//! - `reason`: A programmatic identifier (CamelCase)
//! - `message`: A human-readable explanation
//! - `lastTransitionTime`: RFC3339 timestamp of the last status change
//!
//! All mutations here are in-memory. The Runtime state machine persists its
//! status once per reconciliation; the kubeconfig controller calls
//! [`patch_gardener_cluster_status`].

use crate::crd::{
    Condition, GardenerCluster, GardenerClusterState, GardenerClusterStatus, RuntimeState,
    RuntimeStatus,
};
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_STATUS_UNKNOWN, CONDITION_TYPE_READY,
};
use anyhow::Result;
use chrono::Utc;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use serde_json::json;
use tracing::debug;

/// Create a new condition with the current timestamp.
///
/// # Example
///
/// ```rust
/// # use infrastructure_manager::reconcilers::status::create_condition;
/// let condition = create_condition("Provisioned", "True", "ShootCreationCompleted", "Shoot created");
/// assert_eq!(condition.r#type, "Provisioned");
/// assert_eq!(condition.status, "True");
/// ```
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_transition_time: Some(Utc::now().to_rfc3339()),
    }
}

/// Find a condition by type.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Update or add a condition in a mutable conditions list (in-memory, no API call).
///
/// The `lastTransitionTime` is preserved when the status does not change and
/// refreshed when it does.
pub fn update_condition_in_memory(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) {
    if let Some(existing) = conditions.iter_mut().find(|c| c.r#type == condition_type) {
        let last_transition_time = if existing.status == status {
            existing
                .last_transition_time
                .clone()
                .unwrap_or_else(|| Utc::now().to_rfc3339())
        } else {
            Utc::now().to_rfc3339()
        };

        existing.status = status.to_string();
        existing.reason = Some(reason.to_string());
        existing.message = Some(message.to_string());
        existing.last_transition_time = Some(last_transition_time);
    } else {
        conditions.push(create_condition(condition_type, status, reason, message));
    }
}

/// Compare two condition lists ignoring `lastTransitionTime`.
#[must_use]
pub fn conditions_equal(current: &[Condition], new: &[Condition]) -> bool {
    if current.len() != new.len() {
        return false;
    }

    new.iter().all(|new_cond| {
        current.iter().any(|curr_cond| {
            curr_cond.r#type == new_cond.r#type
                && curr_cond.status == new_cond.status
                && curr_cond.reason == new_cond.reason
                && curr_cond.message == new_cond.message
        })
    })
}

/// Returns the condition whose `lastTransitionTime` is the newest, for event reporting.
#[must_use]
pub fn latest_condition(conditions: &[Condition]) -> Option<&Condition> {
    conditions
        .iter()
        .max_by(|a, b| a.last_transition_time.cmp(&b.last_transition_time))
}

// ============================================================================
// Runtime
// ============================================================================

impl RuntimeStatus {
    fn set(
        &mut self,
        state: RuntimeState,
        condition_type: &str,
        status: &str,
        reason: &str,
        message: &str,
    ) {
        self.state = Some(state);
        update_condition_in_memory(&mut self.conditions, condition_type, status, reason, message);
    }

    /// Runtime is still progressing.
    pub fn set_pending(&mut self, condition_type: &str, status: &str, reason: &str, message: &str) {
        self.set(RuntimeState::Pending, condition_type, status, reason, message);
    }

    /// Runtime is progressing and the given step is not done yet.
    pub fn set_pending_unknown(&mut self, condition_type: &str, reason: &str, message: &str) {
        self.set_pending(condition_type, CONDITION_STATUS_UNKNOWN, reason, message);
    }

    /// Runtime reached its desired state.
    pub fn set_ready(&mut self, condition_type: &str, reason: &str, message: &str) {
        self.set(
            RuntimeState::Ready,
            condition_type,
            CONDITION_STATUS_TRUE,
            reason,
            message,
        );
    }

    /// A step failed; the condition carries the reason.
    pub fn set_failed(&mut self, condition_type: &str, reason: &str, message: &str) {
        self.set(
            RuntimeState::Failed,
            condition_type,
            CONDITION_STATUS_FALSE,
            reason,
            message,
        );
    }

    /// Runtime is being deleted.
    pub fn set_terminating(&mut self, condition_type: &str, reason: &str, message: &str) {
        self.set(
            RuntimeState::Terminating,
            condition_type,
            CONDITION_STATUS_UNKNOWN,
            reason,
            message,
        );
    }

    /// Sets a condition without touching the state.
    pub fn set_condition(&mut self, condition_type: &str, status: &str, reason: &str, message: &str) {
        update_condition_in_memory(&mut self.conditions, condition_type, status, reason, message);
    }

    /// Semantic equality, ignoring transition timestamps.
    #[must_use]
    pub fn semantically_equal(&self, other: &Self) -> bool {
        self.state == other.state && conditions_equal(&self.conditions, &other.conditions)
    }
}

// ============================================================================
// GardenerCluster
// ============================================================================

impl GardenerClusterStatus {
    /// Sets the state and the single `Ready` condition.
    pub fn set(&mut self, state: GardenerClusterState, status: &str, reason: &str, message: &str) {
        self.state = Some(state);
        update_condition_in_memory(
            &mut self.conditions,
            CONDITION_TYPE_READY,
            status,
            reason,
            message,
        );
    }

    pub fn set_ready(&mut self, reason: &str, message: &str) {
        self.set(GardenerClusterState::Ready, CONDITION_STATUS_TRUE, reason, message);
    }

    pub fn set_error(&mut self, reason: &str, message: &str) {
        self.set(GardenerClusterState::Error, CONDITION_STATUS_FALSE, reason, message);
    }

    #[must_use]
    pub fn ready_reason(&self) -> Option<&str> {
        find_condition(&self.conditions, CONDITION_TYPE_READY).and_then(|c| c.reason.as_deref())
    }
}

/// Persist the status of a `GardenerCluster` if it changed.
///
/// # Errors
///
/// Returns an error if the Kubernetes API call fails.
pub async fn patch_gardener_cluster_status(
    client: &Client,
    cluster: &GardenerCluster,
    new_status: &GardenerClusterStatus,
) -> Result<()> {
    if let Some(current) = &cluster.status {
        if current.state == new_status.state
            && conditions_equal(&current.conditions, &new_status.conditions)
        {
            debug!(cluster = %cluster.name_any(), "GardenerCluster status unchanged, skipping update");
            return Ok(());
        }
    }

    let api: Api<GardenerCluster> =
        Api::namespaced(client.clone(), &cluster.namespace().unwrap_or_default());
    let patch = json!({ "status": new_status });
    api.patch_status(&cluster.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    debug!(
        cluster = %cluster.name_any(),
        state = ?new_status.state,
        "Updated GardenerCluster status"
    );
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
