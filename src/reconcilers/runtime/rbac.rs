// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Administrator `ClusterRoleBindings` on the workload cluster.
//!
//! A binding is managed when it carries both `app=kyma` and
//! `reconciler.kyma-project.io/managed-by=infrastructure-manager`. Only managed
//! bindings are ever deleted; everything else on the cluster is left alone.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context as _, Result};
use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::{Api, Client, ResourceExt};
use tracing::info;

use crate::labels::{APP_KYMA, LABEL_APP, LABEL_RECONCILER_MANAGED_BY, MANAGED_BY_INFRASTRUCTURE_MANAGER};
use crate::metrics;
use crate::reconcilers::retry::{is_not_found, retry_workload_call};

const CLUSTER_ADMIN_ROLE: &str = "cluster-admin";
const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";
const SUBJECT_KIND_USER: &str = "User";
const ADMIN_BINDING_GENERATE_NAME: &str = "admin-";

/// Returns `true` when the binding carries both management labels.
#[must_use]
pub fn is_managed(binding: &ClusterRoleBinding) -> bool {
    let labels = binding.labels();
    labels.get(LABEL_APP).map(String::as_str) == Some(APP_KYMA)
        && labels.get(LABEL_RECONCILER_MANAGED_BY).map(String::as_str)
            == Some(MANAGED_BY_INFRASTRUCTURE_MANAGER)
}

fn user_subjects(binding: &ClusterRoleBinding) -> impl Iterator<Item = &str> {
    binding
        .subjects
        .iter()
        .flatten()
        .filter(|s| s.kind == SUBJECT_KIND_USER)
        .map(|s| s.name.as_str())
}

/// A managed binding is stale once any of its users is no longer an administrator.
fn is_stale(binding: &ClusterRoleBinding, admins: &BTreeSet<&str>) -> bool {
    is_managed(binding) && user_subjects(binding).any(|user| !admins.contains(user))
}

/// Managed bindings granting admin to a user who is no longer an administrator.
#[must_use]
pub fn bindings_to_remove<'a>(
    bindings: &'a [ClusterRoleBinding],
    administrators: &[String],
) -> Vec<&'a ClusterRoleBinding> {
    let admins: BTreeSet<&str> = administrators.iter().map(String::as_str).collect();
    bindings.iter().filter(|b| is_stale(b, &admins)).collect()
}

/// Administrators without a managed binding that survives [`bindings_to_remove`],
/// deduplicated and in input order.
#[must_use]
pub fn admins_to_add<'a>(
    bindings: &[ClusterRoleBinding],
    administrators: &'a [String],
) -> Vec<&'a str> {
    let admins: BTreeSet<&str> = administrators.iter().map(String::as_str).collect();
    let bound: BTreeSet<&str> = bindings
        .iter()
        .filter(|b| is_managed(b) && !is_stale(b, &admins))
        .flat_map(user_subjects)
        .collect();

    let mut seen = BTreeSet::new();
    administrators
        .iter()
        .map(String::as_str)
        .filter(|admin| !bound.contains(admin) && seen.insert(*admin))
        .collect()
}

/// Managed `cluster-admin` binding for a single user.
#[must_use]
pub fn build_admin_binding(admin: &str) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: ObjectMeta {
            generate_name: Some(ADMIN_BINDING_GENERATE_NAME.to_string()),
            labels: Some(BTreeMap::from([
                (LABEL_APP.to_string(), APP_KYMA.to_string()),
                (
                    LABEL_RECONCILER_MANAGED_BY.to_string(),
                    MANAGED_BY_INFRASTRUCTURE_MANAGER.to_string(),
                ),
            ])),
            ..ObjectMeta::default()
        },
        role_ref: RoleRef {
            api_group: RBAC_API_GROUP.to_string(),
            kind: "ClusterRole".to_string(),
            name: CLUSTER_ADMIN_ROLE.to_string(),
        },
        subjects: Some(vec![Subject {
            api_group: Some(RBAC_API_GROUP.to_string()),
            kind: SUBJECT_KIND_USER.to_string(),
            name: admin.to_string(),
            namespace: None,
        }]),
    }
}

/// Converges the managed admin bindings on the workload cluster to `administrators`.
///
/// # Errors
///
/// Returns an error if listing, creating or deleting a binding fails.
pub async fn apply_cluster_role_bindings(client: &Client, administrators: &[String]) -> Result<()> {
    let api: Api<ClusterRoleBinding> = Api::all(client.clone());

    let existing = retry_workload_call(
        || async { api.list(&ListParams::default()).await },
        "list ClusterRoleBindings",
    )
    .await?
    .items;

    for binding in bindings_to_remove(&existing, administrators) {
        let name = binding.name_any();
        match api.delete(&name, &DeleteParams::default()).await {
            Ok(_) => {
                info!(binding = %name, "Removed admin ClusterRoleBinding");
                metrics::record_resource_deleted("ClusterRoleBinding");
            }
            Err(e) if is_not_found(&e) => {}
            Err(e) => return Err(e).context(format!("failed to delete ClusterRoleBinding {name}")),
        }
    }

    for admin in admins_to_add(&existing, administrators) {
        let binding = build_admin_binding(admin);
        api.create(&PostParams::default(), &binding)
            .await
            .with_context(|| format!("failed to create admin ClusterRoleBinding for {admin}"))?;
        info!(admin = %admin, "Created admin ClusterRoleBinding");
        metrics::record_resource_created("ClusterRoleBinding");
    }

    Ok(())
}

#[cfg(test)]
#[path = "rbac_tests.rs"]
mod rbac_tests;
