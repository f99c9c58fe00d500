// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `OpenIDConnect` resources on the workload cluster.
//!
//! Managed resources are deleted and recreated on every pass, so the cluster
//! briefly has no additional authenticators while this runs.

use std::collections::BTreeMap;

use anyhow::{Context as _, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::{Api, Client, ResourceExt};
use tracing::{info, warn};

use crate::config::ConverterConfig;
use crate::constants::EXTENSION_OIDC;
use crate::crd::Runtime;
use crate::gardener::{OidcConfig, OpenIDConnect, OpenIDConnectSpec, Shoot, SigningAlgorithm};
use crate::labels::{LABEL_MANAGED_BY, MANAGED_BY_INFRASTRUCTURE_MANAGER};
use crate::metrics;
use crate::reconcilers::retry::{is_not_found, retry_workload_call};

const OIDC_RESOURCE_PREFIX: &str = "kyma-oidc-";

/// Whether the shoot runs the OIDC service extension.
#[must_use]
pub fn oidc_extension_enabled(shoot: &Shoot) -> bool {
    shoot
        .extension(EXTENSION_OIDC)
        .is_some_and(|e| !e.disabled.unwrap_or(false))
}

/// OIDC providers to install: the Runtime's additional configs, or the operator default.
#[must_use]
pub fn desired_oidc_configs(runtime: &Runtime, config: &ConverterConfig) -> Vec<OidcConfig> {
    match &runtime.spec.shoot.kubernetes.kube_api_server.additional_oidc_config {
        Some(configs) => configs.clone(),
        None => vec![config.kubernetes.default_operator_oidc.to_oidc_config()],
    }
}

#[must_use]
pub fn oidc_resource_name(index: usize) -> String {
    format!("{OIDC_RESOURCE_PREFIX}{index}")
}

/// Translates algorithm names, dropping the ones the authenticator does not know.
#[must_use]
pub fn signing_algorithms(names: &[String]) -> Vec<SigningAlgorithm> {
    names
        .iter()
        .filter_map(|name| match name.parse() {
            Ok(alg) => Some(alg),
            Err(e) => {
                warn!(algorithm = %name, error = %e, "Skipping OIDC signing algorithm");
                None
            }
        })
        .collect()
}

#[must_use]
pub fn build_openid_connect(index: usize, oidc: &OidcConfig) -> OpenIDConnect {
    let mut resource = OpenIDConnect::new(
        &oidc_resource_name(index),
        OpenIDConnectSpec {
            issuer_url: oidc.issuer_url.clone().unwrap_or_default(),
            client_id: oidc.client_id.clone().unwrap_or_default(),
            groups_claim: oidc.groups_claim.clone(),
            groups_prefix: oidc.groups_prefix.clone(),
            required_claims: oidc.required_claims.clone(),
            supported_signing_algs: signing_algorithms(
                oidc.signing_algs.as_deref().unwrap_or_default(),
            ),
            username_claim: oidc.username_claim.clone(),
            username_prefix: oidc.username_prefix.clone(),
        },
    );
    resource.metadata = ObjectMeta {
        name: Some(oidc_resource_name(index)),
        labels: Some(BTreeMap::from([(
            LABEL_MANAGED_BY.to_string(),
            MANAGED_BY_INFRASTRUCTURE_MANAGER.to_string(),
        )])),
        ..ObjectMeta::default()
    };
    resource
}

/// Replaces the managed `OpenIDConnect` resources with one per desired config.
///
/// # Errors
///
/// Returns an error if any workload cluster call fails.
pub async fn configure_oidc(
    client: &Client,
    runtime: &Runtime,
    config: &ConverterConfig,
) -> Result<()> {
    let api: Api<OpenIDConnect> = Api::all(client.clone());
    let selector = format!("{LABEL_MANAGED_BY}={MANAGED_BY_INFRASTRUCTURE_MANAGER}");

    let existing = retry_workload_call(
        || async { api.list(&ListParams::default().labels(&selector)).await },
        "list OpenIDConnect",
    )
    .await?;

    for resource in existing.items {
        let name = resource.name_any();
        match api.delete(&name, &DeleteParams::default()).await {
            Ok(_) => metrics::record_resource_deleted("OpenIDConnect"),
            Err(e) if is_not_found(&e) => {}
            Err(e) => return Err(e).context(format!("failed to delete OpenIDConnect {name}")),
        }
    }

    let desired = desired_oidc_configs(runtime, config);
    for (index, oidc) in desired.iter().enumerate() {
        let resource = build_openid_connect(index, oidc);
        api.create(&PostParams::default(), &resource)
            .await
            .with_context(|| format!("failed to create OpenIDConnect {}", resource.name_any()))?;
        metrics::record_resource_created("OpenIDConnect");
    }

    info!(count = desired.len(), "Configured OpenIDConnect resources");
    Ok(())
}

#[cfg(test)]
#[path = "oidc_tests.rs"]
mod oidc_tests;
