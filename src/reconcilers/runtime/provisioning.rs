// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shoot provisioning states: snapshot, create, patch, wait and hand-off.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context as _, Result};
use kube::api::{Patch, PatchParams, PostParams};
use kube::runtime::controller::Action;
use kube::{Api, ResourceExt};
use serde_json::json;
use tracing::{info, warn};

use super::fsm::{Machine, State, SystemState, Transition};
use crate::constants::{
    DEFAULT_KUBECONFIG_KEY, ERROR_INFRA_RATE_LIMITS_EXCEEDED, ERROR_REQUEUE_DURATION_SECS,
    FIELD_MANAGER, GARDENER_REQUEUE_DURATION_SECS, KIND_GARDENER_CLUSTER, KIND_RUNTIME, KIND_SHOOT,
    KUBECONFIG_SECRET_NAME_PREFIX,
    SHOOT_RECONCILE_REQUEUE_DURATION_SECS,
};
use crate::crd::{
    GardenerCluster, GardenerClusterSpec, GardenerClusterState, KubeconfigReference, Runtime,
    SecretReference, ShootReference,
};
use crate::gardener::{LastOperationState, LastOperationType, Shoot};
use crate::labels::{ANNOTATION_RUNTIME_GENERATION, FINALIZER_RUNTIME, IDENTITY_LABELS};
use crate::metrics;
use crate::reconcilers::finalizers::{ensure_finalizer, has_finalizer};
use crate::reconcilers::retry::retry_api_call;
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_STATUS_UNKNOWN,
    CONDITION_TYPE_KUBECONFIG_READY, CONDITION_TYPE_PROVISIONED, REASON_CONVERSION_ERROR,
    REASON_GARDENER_CLUSTER_ERROR, REASON_GARDENER_CLUSTER_READY, REASON_GARDENER_ERROR,
    REASON_INITIALIZED, REASON_KUBERNETES_API_ERROR, REASON_PROCESSING,
    REASON_SHOOT_CREATION_COMPLETED, REASON_SHOOT_CREATION_PENDING,
};

fn gardener_requeue() -> Duration {
    Duration::from_secs(GARDENER_REQUEUE_DURATION_SECS)
}

pub(super) async fn take_snapshot(m: &Machine, state: &mut SystemState) -> Result<Transition> {
    state.snapshot = state.instance.status.clone().unwrap_or_default();

    let shoots = m.ctx.shoots();
    let name = state.shoot_name().to_string();
    state.shoot = retry_api_call(|| async { shoots.get_opt(&name).await }, "get shoot").await?;

    Ok(Transition::Next(State::Initialize))
}

pub(super) async fn initialize(m: &Machine, state: &mut SystemState) -> Result<Transition> {
    if state.instance.metadata.deletion_timestamp.is_some() {
        if !has_finalizer(&state.instance, FINALIZER_RUNTIME) {
            return Ok(Transition::Done(Action::await_change()));
        }
        return Ok(Transition::Next(State::DeleteKubeconfig));
    }

    if ensure_finalizer(&m.ctx.client, &state.instance, FINALIZER_RUNTIME).await? {
        info!(runtime = %state.instance.name_any(), "Added Runtime finalizer");
    }

    if state.instance.status.as_ref().and_then(|s| s.state).is_none() {
        state.status().set_pending_unknown(
            CONDITION_TYPE_PROVISIONED,
            REASON_INITIALIZED,
            "Runtime initialized",
        );
    }

    if state.shoot.is_none() {
        Ok(Transition::Next(State::CreateShoot))
    } else {
        Ok(Transition::Next(State::SelectShootProcessing))
    }
}

/// Converts the Runtime, marking the condition and stopping on failure.
fn convert(m: &Machine, state: &mut SystemState) -> Option<Shoot> {
    match m.ctx.converter().to_shoot(&state.instance) {
        Ok(shoot) => Some(shoot),
        Err(e) => {
            warn!(runtime = %state.instance.name_any(), error = %e, "Runtime conversion failed");
            metrics::record_error(KIND_RUNTIME, REASON_CONVERSION_ERROR);
            state.status().set_failed(
                CONDITION_TYPE_PROVISIONED,
                REASON_CONVERSION_ERROR,
                &format!("Runtime conversion error: {e}"),
            );
            None
        }
    }
}

fn persist_or_wait(m: &Machine) -> Transition {
    if m.ctx.settings.persist_shoot_path.is_some() {
        Transition::Next(State::PersistShoot)
    } else {
        Transition::requeue(gardener_requeue())
    }
}

pub(super) async fn create_shoot(m: &Machine, state: &mut SystemState) -> Result<Transition> {
    let Some(shoot) = convert(m, state) else {
        return Ok(Transition::stop());
    };

    match m.ctx.shoots().create(&PostParams::default(), &shoot).await {
        Ok(created) => {
            info!(runtime = %state.instance.name_any(), shoot = %created.name_any(), "Created shoot");
            metrics::record_resource_created(KIND_SHOOT);
            state.shoot = Some(created);
            state.status().set_pending_unknown(
                CONDITION_TYPE_PROVISIONED,
                REASON_SHOOT_CREATION_PENDING,
                "Shoot is pending",
            );
            Ok(persist_or_wait(m))
        }
        Err(e) => {
            warn!(runtime = %state.instance.name_any(), error = %e, "Failed to create shoot");
            metrics::record_error(KIND_RUNTIME, REASON_GARDENER_ERROR);
            state.status().set_pending(
                CONDITION_TYPE_PROVISIONED,
                CONDITION_STATUS_FALSE,
                REASON_GARDENER_ERROR,
                &format!("Failed to create shoot: {e}"),
            );
            Ok(Transition::requeue(gardener_requeue()))
        }
    }
}

/// Returns `true` when the shoot was last converted from an older Runtime generation.
#[must_use]
pub fn runtime_generation_changed(runtime: &Runtime, shoot: &Shoot) -> bool {
    let applied = shoot
        .annotations()
        .get(ANNOTATION_RUNTIME_GENERATION)
        .and_then(|g| g.parse::<i64>().ok());
    applied != runtime.metadata.generation
}

/// Picks the next state from the shoot's last operation.
pub(super) fn select_shoot_processing(state: &mut SystemState) -> Transition {
    let Some(shoot) = state.shoot.as_ref() else {
        return Transition::Next(State::CreateShoot);
    };
    let Some(operation) = shoot.last_operation() else {
        state.status().set_pending_unknown(
            CONDITION_TYPE_PROVISIONED,
            REASON_SHOOT_CREATION_PENDING,
            "Shoot is pending",
        );
        return Transition::requeue(gardener_requeue());
    };
    let generation_changed = runtime_generation_changed(&state.instance, shoot);

    match (operation.r#type, operation.state) {
        (_, LastOperationState::Succeeded) => Transition::Next(State::PatchExistingShoot),
        (_, LastOperationState::Failed) if generation_changed => {
            Transition::Next(State::PatchExistingShoot)
        }
        (LastOperationType::Create, _) => Transition::Next(State::WaitForShootCreation),
        (LastOperationType::Reconcile, _) => Transition::Next(State::WaitForShootReconcile),
        (other, _) => {
            let message = format!("Shoot is in {other:?} operation");
            state.status().set_pending_unknown(
                CONDITION_TYPE_PROVISIONED,
                REASON_PROCESSING,
                &message,
            );
            Transition::requeue(gardener_requeue())
        }
    }
}

pub(super) async fn patch_existing_shoot(m: &Machine, state: &mut SystemState) -> Result<Transition> {
    let Some(desired) = convert(m, state) else {
        return Ok(Transition::stop());
    };
    let previous_generation = state.shoot.as_ref().and_then(|s| s.metadata.generation);

    let params = PatchParams::apply(FIELD_MANAGER).force();
    match m
        .ctx
        .shoots()
        .patch(state.shoot_name(), &params, &Patch::Apply(&desired))
        .await
    {
        Ok(patched) => {
            let changed = patched.metadata.generation != previous_generation;
            state.shoot = Some(patched);

            if changed {
                info!(runtime = %state.instance.name_any(), shoot = %state.shoot_name(), "Patched shoot");
                state.status().set_pending_unknown(
                    CONDITION_TYPE_PROVISIONED,
                    REASON_PROCESSING,
                    "Shoot is pending for update",
                );
                return Ok(persist_or_wait(m));
            }

            state.status().set_pending(
                CONDITION_TYPE_PROVISIONED,
                CONDITION_STATUS_TRUE,
                REASON_SHOOT_CREATION_COMPLETED,
                "Shoot is provisioned",
            );
            Ok(Transition::Next(State::ProcessShoot))
        }
        Err(e) => {
            warn!(runtime = %state.instance.name_any(), error = %e, "Failed to patch shoot");
            metrics::record_error(KIND_RUNTIME, REASON_GARDENER_ERROR);
            state.status().set_pending(
                CONDITION_TYPE_PROVISIONED,
                CONDITION_STATUS_FALSE,
                REASON_GARDENER_ERROR,
                &format!("Failed to patch shoot: {e}"),
            );
            Ok(Transition::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS)))
        }
    }
}

fn last_error_description(shoot: &Shoot) -> String {
    shoot
        .last_operation()
        .map(|op| op.description.clone())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "no description".to_string())
}

pub(super) fn wait_for_shoot_creation(state: &mut SystemState) -> Transition {
    let Some(shoot) = state.shoot.clone() else {
        return Transition::Next(State::CreateShoot);
    };
    let Some(operation) = shoot.last_operation() else {
        return Transition::requeue(gardener_requeue());
    };

    match operation.state {
        LastOperationState::Succeeded => {
            state.status().set_pending(
                CONDITION_TYPE_PROVISIONED,
                CONDITION_STATUS_TRUE,
                REASON_SHOOT_CREATION_COMPLETED,
                "Shoot creation completed",
            );
            Transition::Next(State::ProcessShoot)
        }
        LastOperationState::Failed => {
            let codes = shoot.error_codes();
            let message = format!(
                "Shoot creation failed: {} (codes: {})",
                last_error_description(&shoot),
                codes.join(", ")
            );
            if codes.iter().any(|c| c == ERROR_INFRA_RATE_LIMITS_EXCEEDED) {
                state.status().set_pending(
                    CONDITION_TYPE_PROVISIONED,
                    CONDITION_STATUS_FALSE,
                    REASON_GARDENER_ERROR,
                    &message,
                );
                return Transition::requeue(gardener_requeue());
            }
            state
                .status()
                .set_failed(CONDITION_TYPE_PROVISIONED, REASON_GARDENER_ERROR, &message);
            Transition::stop()
        }
        _ => {
            state.status().set_pending_unknown(
                CONDITION_TYPE_PROVISIONED,
                REASON_SHOOT_CREATION_PENDING,
                &format!("Shoot creation in progress: {}%", operation.progress),
            );
            Transition::requeue(gardener_requeue())
        }
    }
}

pub(super) fn wait_for_shoot_reconcile(state: &mut SystemState) -> Transition {
    let Some(shoot) = state.shoot.clone() else {
        return Transition::Next(State::CreateShoot);
    };
    let Some(operation) = shoot.last_operation() else {
        return Transition::requeue(gardener_requeue());
    };

    match operation.state {
        LastOperationState::Succeeded => {
            state.status().set_pending(
                CONDITION_TYPE_PROVISIONED,
                CONDITION_STATUS_TRUE,
                REASON_SHOOT_CREATION_COMPLETED,
                "Shoot update completed",
            );
            Transition::Next(State::ProcessShoot)
        }
        LastOperationState::Failed => {
            let message = format!(
                "Shoot reconcile failed, error codes: {}",
                shoot.error_codes().join(", ")
            );
            state
                .status()
                .set_failed(CONDITION_TYPE_PROVISIONED, REASON_GARDENER_ERROR, &message);
            Transition::stop()
        }
        _ => {
            state.status().set_pending_unknown(
                CONDITION_TYPE_PROVISIONED,
                REASON_PROCESSING,
                "Shoot update in progress",
            );
            Transition::requeue(Duration::from_secs(SHOOT_RECONCILE_REQUEUE_DURATION_SECS))
        }
    }
}

/// Companion `GardenerCluster` requesting the kubeconfig Secret of a Runtime.
#[must_use]
pub fn build_gardener_cluster(runtime: &Runtime, runtime_id: &str) -> GardenerCluster {
    let namespace = runtime.namespace().unwrap_or_default();
    let labels: BTreeMap<String, String> = runtime
        .labels()
        .iter()
        .filter(|(key, _)| IDENTITY_LABELS.contains(&key.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut cluster = GardenerCluster::new(
        runtime_id,
        GardenerClusterSpec {
            shoot: ShootReference {
                name: runtime.spec.shoot.name.clone(),
            },
            kubeconfig: KubeconfigReference {
                secret: SecretReference {
                    name: format!("{KUBECONFIG_SECRET_NAME_PREFIX}{runtime_id}"),
                    namespace: namespace.clone(),
                    key: DEFAULT_KUBECONFIG_KEY.to_string(),
                },
            },
        },
    );
    cluster.metadata.namespace = Some(namespace);
    cluster.metadata.labels = Some(labels);
    cluster
}

pub(super) async fn process_shoot(m: &Machine, state: &mut SystemState) -> Result<Transition> {
    let desired = build_gardener_cluster(&state.instance, &state.runtime_id());
    let api: Api<GardenerCluster> = Api::namespaced(
        m.ctx.client.clone(),
        &state.instance.namespace().unwrap_or_default(),
    );

    let current = match apply_gardener_cluster(&api, &desired).await {
        Ok(current) => current,
        Err(e) => {
            state.status().set_pending(
                CONDITION_TYPE_KUBECONFIG_READY,
                CONDITION_STATUS_FALSE,
                REASON_KUBERNETES_API_ERROR,
                &format!("{e:#}"),
            );
            return Err(e);
        }
    };

    let (status, reason, message) = match current.status.as_ref().and_then(|s| s.state) {
        Some(GardenerClusterState::Ready) => (
            CONDITION_STATUS_TRUE,
            REASON_GARDENER_CLUSTER_READY,
            "Kubeconfig secret is ready".to_string(),
        ),
        Some(GardenerClusterState::Error) => (
            CONDITION_STATUS_FALSE,
            REASON_GARDENER_CLUSTER_ERROR,
            current
                .status
                .as_ref()
                .and_then(|s| s.conditions.first())
                .and_then(|c| c.message.clone())
                .unwrap_or_else(|| "Kubeconfig secret failed".to_string()),
        ),
        _ => (
            CONDITION_STATUS_UNKNOWN,
            REASON_PROCESSING,
            "Kubeconfig secret is pending".to_string(),
        ),
    };
    state
        .status()
        .set_condition(CONDITION_TYPE_KUBECONFIG_READY, status, reason, &message);

    Ok(Transition::Next(State::ConfigureOidc))
}

async fn apply_gardener_cluster(
    api: &Api<GardenerCluster>,
    desired: &GardenerCluster,
) -> Result<GardenerCluster> {
    let name = desired.name_any();
    let existing = retry_api_call(|| async { api.get_opt(&name).await }, "get GardenerCluster").await?;

    match existing {
        None => {
            let created = api
                .create(&PostParams::default(), desired)
                .await
                .with_context(|| format!("failed to create GardenerCluster {name}"))?;
            info!(cluster = %name, "Created GardenerCluster");
            metrics::record_resource_created(KIND_GARDENER_CLUSTER);
            Ok(created)
        }
        Some(existing) if existing.spec == desired.spec && existing.labels() == desired.labels() => {
            Ok(existing)
        }
        Some(_) => {
            let patch = json!({
                "metadata": { "labels": desired.labels() },
                "spec": desired.spec,
            });
            api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
                .await
                .with_context(|| format!("failed to update GardenerCluster {name}"))
        }
    }
}

#[cfg(test)]
#[path = "provisioning_tests.rs"]
mod provisioning_tests;
