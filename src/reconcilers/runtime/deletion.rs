// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Deletion states: the companion `GardenerCluster` goes first, then the shoot.

use std::time::Duration;

use anyhow::{Context as _, Result};
use kube::api::{DeleteParams, Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::{Api, ResourceExt};
use serde_json::json;
use tracing::info;

use super::fsm::{Machine, State, SystemState, Transition};
use crate::constants::{
    GARDENER_REQUEUE_DURATION_SECS, KIND_GARDENER_CLUSTER, KIND_SHOOT,
    KUBECONFIG_DELETION_REQUEUE_DURATION_SECS,
};
use crate::crd::GardenerCluster;
use crate::labels::{ANNOTATION_DELETION_CONFIRMATION, FINALIZER_RUNTIME};
use crate::metrics;
use crate::reconcilers::finalizers::remove_finalizer;
use crate::reconcilers::retry::{is_not_found, retry_api_call};
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_TYPE_KUBECONFIG_READY, CONDITION_TYPE_PROVISIONED,
    REASON_DELETION, REASON_DELETION_ERROR,
};

pub(super) async fn delete_kubeconfig(m: &Machine, state: &mut SystemState) -> Result<Transition> {
    let api: Api<GardenerCluster> = Api::namespaced(
        m.ctx.client.clone(),
        &state.instance.namespace().unwrap_or_default(),
    );
    let name = state.runtime_id();

    let Some(cluster) =
        retry_api_call(|| async { api.get_opt(&name).await }, "get GardenerCluster").await?
    else {
        return Ok(Transition::Next(State::DeleteShoot));
    };

    if cluster.metadata.deletion_timestamp.is_none() {
        match api.delete(&name, &DeleteParams::default()).await {
            Ok(_) => {
                info!(runtime = %state.instance.name_any(), cluster = %name, "Deleting GardenerCluster");
                metrics::record_resource_deleted(KIND_GARDENER_CLUSTER);
            }
            Err(e) if is_not_found(&e) => return Ok(Transition::Next(State::DeleteShoot)),
            Err(e) => {
                state.status().set_condition(
                    CONDITION_TYPE_KUBECONFIG_READY,
                    CONDITION_STATUS_FALSE,
                    REASON_DELETION_ERROR,
                    &format!("Failed to delete GardenerCluster: {e}"),
                );
                return Err(e).context(format!("failed to delete GardenerCluster {name}"));
            }
        }
    }

    state.status().set_terminating(
        CONDITION_TYPE_KUBECONFIG_READY,
        REASON_DELETION,
        "Kubeconfig secret is being deleted",
    );
    Ok(Transition::requeue(Duration::from_secs(
        KUBECONFIG_DELETION_REQUEUE_DURATION_SECS,
    )))
}

pub(super) async fn delete_shoot(m: &Machine, state: &mut SystemState) -> Result<Transition> {
    let Some(shoot) = state.shoot.clone() else {
        remove_finalizer(&m.ctx.client, &state.instance, FINALIZER_RUNTIME).await?;
        metrics::clear_runtime_state(&state.runtime_id());
        info!(runtime = %state.instance.name_any(), "Runtime deleted");
        return Ok(Transition::Done(Action::await_change()));
    };

    if shoot.metadata.deletion_timestamp.is_none() {
        let shoots = m.ctx.shoots();
        let name = shoot.name_any();
        let patch = json!({ "metadata": { "annotations": { ANNOTATION_DELETION_CONFIRMATION: "true" } } });

        let result = match shoots
            .patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
        {
            Ok(_) => shoots.delete(&name, &DeleteParams::default()).await.map(|_| ()),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                info!(runtime = %state.instance.name_any(), shoot = %name, "Deleting shoot");
                metrics::record_resource_deleted(KIND_SHOOT);
            }
            Err(e) if is_not_found(&e) => {}
            Err(e) => {
                state.status().set_condition(
                    CONDITION_TYPE_PROVISIONED,
                    CONDITION_STATUS_FALSE,
                    REASON_DELETION_ERROR,
                    &format!("Failed to delete shoot: {e}"),
                );
                return Err(e).context(format!("failed to delete shoot {name}"));
            }
        }
    }

    state.status().set_terminating(
        CONDITION_TYPE_PROVISIONED,
        REASON_DELETION,
        "Shoot is being deleted",
    );
    Ok(Transition::requeue(Duration::from_secs(GARDENER_REQUEUE_DURATION_SECS)))
}
