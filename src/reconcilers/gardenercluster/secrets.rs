// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Construction and lookup of managed kubeconfig Secrets.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::ResourceExt;
use serde_json::{json, Value};

use super::rotation::{parse_last_sync, SecretState};
use crate::crd::GardenerCluster;
use crate::labels::{
    ANNOTATION_FORCE_KUBECONFIG_ROTATION, ANNOTATION_LAST_SYNC, IDENTITY_LABELS, LABEL_CLUSTER_NAME, LABEL_MANAGED_BY, LABEL_SHOOT_NAME,
    MANAGED_BY_INFRASTRUCTURE_MANAGER,
};

/// Selector for the Secret belonging to a shoot.
#[must_use]
pub fn shoot_selector(shoot_name: &str) -> String {
    format!("{LABEL_SHOOT_NAME}={shoot_name}")
}

/// Selector for the Secrets owned by a `GardenerCluster`.
#[must_use]
pub fn cluster_selector(cluster_name: &str) -> String {
    format!("{LABEL_CLUSTER_NAME}={cluster_name}")
}

/// Reduces a label lookup to at most one Secret.
///
/// # Errors
///
/// More than one match violates the one-Secret-per-cluster invariant and is
/// reported instead of repaired.
pub fn single_secret(mut secrets: Vec<Secret>, selector: &str) -> Result<Option<Secret>> {
    match secrets.len() {
        0 => Ok(None),
        1 => Ok(secrets.pop()),
        n => bail!("found {n} secrets matching {selector}, expected at most one"),
    }
}

/// Labels of a managed Secret: identity labels of the cluster plus management labels.
#[must_use]
pub fn secret_labels(cluster: &GardenerCluster) -> BTreeMap<String, String> {
    let mut labels: BTreeMap<String, String> = cluster
        .labels()
        .iter()
        .filter(|(key, _)| IDENTITY_LABELS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    labels.insert(
        LABEL_SHOOT_NAME.to_string(),
        cluster.spec.shoot.name.clone(),
    );
    labels.insert(LABEL_CLUSTER_NAME.to_string(), cluster.name_any());
    labels.insert(
        LABEL_MANAGED_BY.to_string(),
        MANAGED_BY_INFRASTRUCTURE_MANAGER.to_string(),
    );
    labels
}

/// Formats a timestamp the way it is stored in `last-sync`.
#[must_use]
pub fn format_last_sync(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// A new managed Secret holding `kubeconfig`.
#[must_use]
pub fn build_secret(cluster: &GardenerCluster, kubeconfig: &[u8], now: DateTime<Utc>) -> Secret {
    let reference = &cluster.spec.kubeconfig.secret;
    Secret {
        metadata: ObjectMeta {
            name: Some(reference.name.clone()),
            namespace: Some(reference.namespace.clone()),
            labels: Some(secret_labels(cluster)),
            annotations: Some(BTreeMap::from([(
                ANNOTATION_LAST_SYNC.to_string(),
                format_last_sync(now),
            )])),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            reference.key.clone(),
            ByteString(kubeconfig.to_vec()),
        )])),
        ..Default::default()
    }
}

/// Merge patch storing a fresh kubeconfig and its issuance time.
#[must_use]
pub fn rotation_patch(
    cluster: &GardenerCluster,
    kubeconfig: &[u8],
    now: DateTime<Utc>,
) -> Value {
    let key = &cluster.spec.kubeconfig.secret.key;
    json!({
        "metadata": {
            "labels": secret_labels(cluster),
            "annotations": { ANNOTATION_LAST_SYNC: format_last_sync(now) },
        },
        "data": { key.as_str(): ByteString(kubeconfig.to_vec()) },
    })
}

/// Merge patch removing the kubeconfig and its `last-sync` annotation.
#[must_use]
pub fn revocation_patch(cluster: &GardenerCluster) -> Value {
    let key = &cluster.spec.kubeconfig.secret.key;
    json!({
        "metadata": { "annotations": { ANNOTATION_LAST_SYNC: null } },
        "data": { key.as_str(): null },
    })
}

/// Merge patch clearing a handled forced rotation request on the cluster.
#[must_use]
pub fn force_rotation_removal_patch() -> Value {
    json!({ "metadata": { "annotations": { ANNOTATION_FORCE_KUBECONFIG_ROTATION: null } } })
}

/// Rotation relevant view of an optional Secret.
#[must_use]
pub fn secret_state(secret: Option<&Secret>, key: &str) -> SecretState {
    let Some(secret) = secret else {
        return SecretState::Missing;
    };
    SecretState::Present {
        last_sync: secret
            .annotations()
            .get(ANNOTATION_LAST_SYNC)
            .and_then(|value| parse_last_sync(value)),
        has_kubeconfig: secret
            .data
            .as_ref()
            .and_then(|data| data.get(key))
            .is_some_and(|value| !value.0.is_empty()),
    }
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod secrets_tests;
