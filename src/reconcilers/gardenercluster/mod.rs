// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `GardenerCluster` reconciliation.
//!
//! Keeps a Secret holding a periodically rotated admin kubeconfig of the
//! referenced shoot. The Secret is found by label, never by name:
//! `kyma-project.io/shoot-name` while the cluster exists and
//! `operator.kyma-project.io/cluster-name` once it is being deleted.

pub mod rotation;
pub mod secrets;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use chrono::Utc;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::runtime::controller::Action;
use kube::{Api, Client, ResourceExt};
use tracing::{debug, info, warn};

use self::rotation::{rotation_decision, RotationDecision, RotationReason};
use self::secrets::{
    build_secret, cluster_selector, force_rotation_removal_patch, revocation_patch, rotation_patch,
    secret_state, shoot_selector, single_secret,
};
use crate::constants::KIND_GARDENER_CLUSTER;
use crate::context::Context;
use crate::crd::{GardenerCluster, GardenerClusterState, GardenerClusterStatus};
use crate::errors::KubeconfigError;
use crate::labels::{ANNOTATION_FORCE_KUBECONFIG_ROTATION, FINALIZER_GARDENER_CLUSTER, LABEL_RUNTIME_ID};
use crate::metrics;
use crate::reconcilers::finalizers::{ensure_finalizer, handle_deletion, FinalizerCleanup};
use crate::reconcilers::retry::is_not_found;
use crate::reconcilers::status::patch_gardener_cluster_status;
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, REASON_FAILED_TO_CREATE_SECRET, REASON_FAILED_TO_DELETE_SECRET, REASON_FAILED_TO_GET_KUBECONFIG,
    REASON_FAILED_TO_GET_SECRET, REASON_FAILED_TO_UPDATE_SECRET, REASON_KUBECONFIG_SECRET_CREATED,
    REASON_KUBECONFIG_SECRET_REVOKED, REASON_KUBECONFIG_SECRET_ROTATED,
    REASON_KUBECONFIG_SECRET_UP_TO_DATE,
};

/// Requeue after revocation steps, so the next step runs promptly.
const FORCED_ROTATION_REQUEUE: Duration = Duration::from_secs(1);

/// Reconciles one `GardenerCluster` within the configured request timeout.
///
/// # Errors
///
/// Returns an error on transient failures; the controller's error policy requeues.
pub async fn reconcile_gardener_cluster(
    cluster: Arc<GardenerCluster>,
    ctx: Arc<Context>,
) -> Result<Action> {
    let timeout = ctx.settings.gardener_request_timeout;
    tokio::time::timeout(timeout, reconcile(&cluster, &ctx))
        .await
        .with_context(|| {
            format!(
                "reconciliation of GardenerCluster {} exceeded {timeout:?}",
                cluster.name_any()
            )
        })?
}

async fn reconcile(cluster: &GardenerCluster, ctx: &Context) -> Result<Action> {
    let client = &ctx.client;

    if cluster.metadata.deletion_timestamp.is_some() {
        handle_deletion(client, cluster, FINALIZER_GARDENER_CLUSTER).await?;
        return Ok(Action::await_change());
    }

    ensure_finalizer(client, cluster, FINALIZER_GARDENER_CLUSTER).await?;

    let mut status = cluster.status.clone().unwrap_or_default();
    let outcome = sync_secret(cluster, ctx, &mut status).await;

    // Best effort: the condition should become visible even when the body failed.
    if let Err(e) = patch_gardener_cluster_status(client, cluster, &status).await {
        warn!(cluster = %cluster.name_any(), error = %e, "Failed to update GardenerCluster status");
    }
    publish_state_metric(cluster, &status);

    outcome
}

async fn sync_secret(
    cluster: &GardenerCluster,
    ctx: &Context,
    status: &mut GardenerClusterStatus,
) -> Result<Action> {
    let reference = &cluster.spec.kubeconfig.secret;
    let secrets: Api<Secret> = Api::namespaced(ctx.client.clone(), &reference.namespace);
    let selector = shoot_selector(&cluster.spec.shoot.name);

    let existing = match find_secret(&secrets, &selector).await {
        Ok(existing) => existing,
        Err(e) => {
            status.set_error(REASON_FAILED_TO_GET_SECRET, &format!("{e:#}"));
            return Err(e);
        }
    };

    let settings = &ctx.settings.rotation;
    let force = cluster
        .annotations()
        .contains_key(ANNOTATION_FORCE_KUBECONFIG_ROTATION);
    let now = Utc::now();
    let decision = rotation_decision(
        force,
        secret_state(existing.as_ref(), &reference.key),
        now,
        settings,
    );
    debug!(cluster = %cluster.name_any(), ?decision, "Kubeconfig rotation decision");

    match decision {
        RotationDecision::Skip { requeue_after } => {
            if status.state != Some(GardenerClusterState::Ready) {
                status.set_ready(REASON_KUBECONFIG_SECRET_UP_TO_DATE, "Kubeconfig is up to date");
            }
            metrics::record_reconciliation_requeue(KIND_GARDENER_CLUSTER, "rotation");
            Ok(Action::requeue(requeue_after))
        }
        RotationDecision::Revoke => {
            let name = existing.map(|s| s.name_any()).unwrap_or_default();
            if let Err(e) = secrets
                .patch(&name, &PatchParams::default(), &Patch::Merge(&revocation_patch(cluster)))
                .await
            {
                status.set_error(REASON_FAILED_TO_UPDATE_SECRET, &e.to_string());
                return Err(e.into());
            }
            info!(cluster = %cluster.name_any(), secret = %name, "Revoked kubeconfig on forced rotation");
            metrics::clear_kubeconfig_expiration(runtime_id(cluster), &cluster.spec.shoot.name);
            status.set(
                GardenerClusterState::Processing,
                CONDITION_STATUS_FALSE,
                REASON_KUBECONFIG_SECRET_REVOKED,
                "Kubeconfig revoked, rotation pending",
            );
            Ok(Action::requeue(FORCED_ROTATION_REQUEUE))
        }
        RotationDecision::RemoveForceAnnotation => {
            remove_force_annotation(&ctx.client, cluster).await?;
            Ok(Action::requeue(FORCED_ROTATION_REQUEUE))
        }
        RotationDecision::Create | RotationDecision::Rotate(_) => {
            let Some(kubeconfig) = fetch_kubeconfig(cluster, ctx, status).await? else {
                return Ok(Action::await_change());
            };

            let result = match (decision, existing) {
                (RotationDecision::Create, _) | (_, None) => {
                    create_secret(&secrets, cluster, &kubeconfig, now, status).await
                }
                (_, Some(secret)) => {
                    update_secret(&secrets, cluster, &secret, &kubeconfig, now, status, decision)
                        .await
                }
            };
            result?;

            let expires_at = now.timestamp()
                + i64::try_from(settings.period.as_secs()).unwrap_or(i64::MAX / 2);
            metrics::set_kubeconfig_expiration(
                runtime_id(cluster),
                &cluster.spec.shoot.name,
                expires_at,
            );
            Ok(Action::requeue(settings.threshold()))
        }
    }
}

async fn find_secret(secrets: &Api<Secret>, selector: &str) -> Result<Option<Secret>> {
    let list = secrets
        .list(&ListParams::default().labels(selector))
        .await
        .with_context(|| format!("failed to list secrets by {selector}"))?;
    single_secret(list.items, selector)
}

/// Returns `None` when the shoot no longer exists; that is terminal for this cluster.
async fn fetch_kubeconfig(
    cluster: &GardenerCluster,
    ctx: &Context,
    status: &mut GardenerClusterStatus,
) -> Result<Option<Vec<u8>>> {
    let shoot = &cluster.spec.shoot.name;
    match ctx
        .kubeconfig_provider
        .fetch(shoot, ctx.settings.rotation.expiration_seconds())
        .await
    {
        Ok(kubeconfig) => Ok(Some(kubeconfig)),
        Err(e @ KubeconfigError::ShootNotFound { .. }) => {
            warn!(cluster = %cluster.name_any(), shoot = %shoot, "Shoot not found, giving up");
            status.set_error(REASON_FAILED_TO_GET_KUBECONFIG, &e.to_string());
            metrics::record_error(KIND_GARDENER_CLUSTER, "gardener");
            Ok(None)
        }
        Err(e) => {
            status.set_error(REASON_FAILED_TO_GET_KUBECONFIG, &e.to_string());
            metrics::record_error(KIND_GARDENER_CLUSTER, "gardener");
            Err(e.into())
        }
    }
}

async fn create_secret(
    secrets: &Api<Secret>,
    cluster: &GardenerCluster,
    kubeconfig: &[u8],
    now: chrono::DateTime<Utc>,
    status: &mut GardenerClusterStatus,
) -> Result<()> {
    let secret = build_secret(cluster, kubeconfig, now);
    if let Err(e) = secrets.create(&PostParams::default(), &secret).await {
        status.set_error(REASON_FAILED_TO_CREATE_SECRET, &e.to_string());
        return Err(e.into());
    }
    info!(cluster = %cluster.name_any(), secret = %cluster.spec.kubeconfig.secret.name, "Created kubeconfig secret");
    metrics::record_resource_created("Secret");
    status.set_ready(REASON_KUBECONFIG_SECRET_CREATED, "Kubeconfig secret created");
    Ok(())
}

async fn update_secret(
    secrets: &Api<Secret>,
    cluster: &GardenerCluster,
    secret: &Secret,
    kubeconfig: &[u8],
    now: chrono::DateTime<Utc>,
    status: &mut GardenerClusterStatus,
    decision: RotationDecision,
) -> Result<()> {
    let name = secret.name_any();
    let patch = rotation_patch(cluster, kubeconfig, now);
    if let Err(e) = secrets
        .patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
    {
        status.set_error(REASON_FAILED_TO_UPDATE_SECRET, &e.to_string());
        return Err(e.into());
    }

    let why = match decision {
        RotationDecision::Rotate(RotationReason::MissingLastSync) => "last-sync missing",
        _ => "rotation period elapsed",
    };
    info!(cluster = %cluster.name_any(), secret = %name, reason = why, "Rotated kubeconfig");
    status.set_ready(REASON_KUBECONFIG_SECRET_ROTATED, "Kubeconfig secret rotated");
    Ok(())
}

async fn remove_force_annotation(client: &Client, cluster: &GardenerCluster) -> Result<()> {
    let api: Api<GardenerCluster> =
        Api::namespaced(client.clone(), &cluster.namespace().unwrap_or_default());
    let patch = force_rotation_removal_patch();
    api.patch(&cluster.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .context("failed to remove force-kubeconfig-rotation annotation")?;
    info!(cluster = %cluster.name_any(), "Cleared forced rotation request");
    Ok(())
}

fn runtime_id(cluster: &GardenerCluster) -> &str {
    cluster
        .labels()
        .get(LABEL_RUNTIME_ID)
        .map_or_else(|| cluster.metadata.name.as_deref().unwrap_or_default(), String::as_str)
}

fn publish_state_metric(cluster: &GardenerCluster, status: &GardenerClusterStatus) {
    if let Some(state) = status.state {
        metrics::set_gardener_cluster_state(
            runtime_id(cluster),
            &cluster.spec.shoot.name,
            &state.to_string(),
            status.ready_reason().unwrap_or_default(),
        );
    }
}

/// Deletes the Secret owned by a cluster. Zero Secrets is a no-op; more than one is fatal.
///
/// # Errors
///
/// Returns an error if listing or deleting fails or the invariant is violated.
pub async fn delete_kubeconfig_secret(client: &Client, cluster: &GardenerCluster) -> Result<()> {
    let namespace = &cluster.spec.kubeconfig.secret.namespace;
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
    let selector = cluster_selector(&cluster.name_any());

    if let Some(secret) = find_secret(&secrets, &selector).await? {
        let name = secret.name_any();
        match secrets.delete(&name, &DeleteParams::default()).await {
            Ok(_) => {
                info!(cluster = %cluster.name_any(), secret = %name, "Deleted kubeconfig secret");
                metrics::record_resource_deleted("Secret");
            }
            Err(e) if is_not_found(&e) => {}
            Err(e) => {
                metrics::record_error(KIND_GARDENER_CLUSTER, REASON_FAILED_TO_DELETE_SECRET);
                return Err(e).context(format!("failed to delete secret {namespace}/{name}"));
            }
        }
    }

    metrics::clear_gardener_cluster(runtime_id(cluster), &cluster.spec.shoot.name);
    Ok(())
}

#[async_trait::async_trait]
impl FinalizerCleanup for GardenerCluster {
    async fn cleanup(&self, client: &Client) -> Result<()> {
        delete_kubeconfig_secret(client, self).await
    }
}
