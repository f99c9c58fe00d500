// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Post-provisioning states: OIDC, administrator bindings and audit log.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, Result};
use kube::api::{Patch, PatchParams};
use kube::{Client, ResourceExt};
use tracing::{debug, info, warn};

use super::auditlog::{apply_audit_log, audit_log_patch, load_tenant_configs, tenant_for};
use super::fsm::{Machine, State, SystemState, Transition};
use super::{oidc, rbac};
use crate::constants::{
    AUDIT_LOG_RETRY_DURATION_SECS, GARDENER_REQUEUE_DURATION_SECS, KIND_RUNTIME,
    POST_PROVISIONING_KUBECONFIG_EXPIRATION_SECS, READY_REQUEUE_DURATION_SECS,
};
use crate::errors::AuditLogError;
use crate::gardener::kubeconfig::client_from_kubeconfig;
use crate::gardener::Shoot;
use crate::metrics;
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_AUDIT_LOG_CONFIGURED,
    CONDITION_TYPE_CONFIGURED, CONDITION_TYPE_OIDC_CONFIGURED, REASON_AUDIT_LOG_CONFIGURED,
    REASON_AUDIT_LOG_ERROR, REASON_CONFIGURATION_COMPLETED, REASON_CONFIGURATION_ERROR,
    REASON_OIDC_CONFIGURED, REASON_OIDC_ERROR,
};

/// Client for the provisioned cluster, from a short-lived admin kubeconfig.
async fn workload_client(m: &Machine, state: &mut SystemState) -> Result<Client> {
    if let Some(client) = &state.workload_client {
        return Ok(client.clone());
    }

    let kubeconfig = m
        .ctx
        .kubeconfig_provider
        .fetch(state.shoot_name(), POST_PROVISIONING_KUBECONFIG_EXPIRATION_SECS)
        .await
        .with_context(|| format!("failed to get admin kubeconfig of shoot {}", state.shoot_name()))?;
    let client = client_from_kubeconfig(&kubeconfig).await?;
    state.workload_client = Some(client.clone());
    Ok(client)
}

pub(super) async fn configure_oidc(m: &Machine, state: &mut SystemState) -> Result<Transition> {
    if !state.shoot.as_ref().is_some_and(oidc::oidc_extension_enabled) {
        debug!(runtime = %state.instance.name_any(), "OIDC extension disabled, skipping OIDC configuration");
        return Ok(Transition::Next(State::ApplyClusterRoleBindings));
    }

    let result = match workload_client(m, state).await {
        Ok(client) => oidc::configure_oidc(&client, &state.instance, &m.ctx.config.converter).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            state.status().set_condition(
                CONDITION_TYPE_OIDC_CONFIGURED,
                CONDITION_STATUS_TRUE,
                REASON_OIDC_CONFIGURED,
                "OIDC configuration completed",
            );
            Ok(Transition::Next(State::ApplyClusterRoleBindings))
        }
        Err(e) => {
            metrics::record_error(KIND_RUNTIME, REASON_OIDC_ERROR);
            state.status().set_pending(
                CONDITION_TYPE_OIDC_CONFIGURED,
                CONDITION_STATUS_FALSE,
                REASON_OIDC_ERROR,
                &format!("{e:#}"),
            );
            Err(e)
        }
    }
}

pub(super) async fn apply_cluster_role_bindings(
    m: &Machine,
    state: &mut SystemState,
) -> Result<Transition> {
    let administrators = state.instance.spec.security.administrators.clone();
    let result = match workload_client(m, state).await {
        Ok(client) => rbac::apply_cluster_role_bindings(&client, &administrators).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        metrics::record_error(KIND_RUNTIME, REASON_CONFIGURATION_ERROR);
        state.status().set_pending(
            CONDITION_TYPE_CONFIGURED,
            CONDITION_STATUS_FALSE,
            REASON_CONFIGURATION_ERROR,
            &format!("Failed to apply cluster role bindings: {e:#}"),
        );
        return Err(e);
    }

    Ok(Transition::Next(State::ConfigureAuditLog))
}

fn finish_ready(state: &mut SystemState) -> Transition {
    state.status().set_ready(
        CONDITION_TYPE_CONFIGURED,
        REASON_CONFIGURATION_COMPLETED,
        "Runtime processing completed successfully",
    );
    Transition::requeue(Duration::from_secs(READY_REQUEUE_DURATION_SECS))
}

/// Applies the audit log tenant of the shoot's seed and region. Returns whether the shoot changed.
async fn prepare_audit_log(
    m: &Machine,
    shoot: &mut Shoot,
    seed_name: &str,
    tenant_config_path: &Path,
) -> Result<bool, AuditLogError> {
    let seed = m.ctx.seeds().get(seed_name).await?;
    let provider_type = seed.spec.provider.r#type.clone();
    if provider_type.is_empty() {
        return Err(AuditLogError::SeedWithoutProvider(seed_name.to_string()));
    }

    let configs = load_tenant_configs(tenant_config_path)?;
    let tenant = tenant_for(&configs, &provider_type, &shoot.spec.region)?;
    let policy = &m.ctx.config.converter.audit_logging.policy_config_map_name;
    Ok(apply_audit_log(shoot, tenant, policy))
}

pub(super) async fn configure_audit_log(m: &Machine, state: &mut SystemState) -> Result<Transition> {
    let tenant_config_path = m.ctx.config.converter.audit_logging.tenant_config_path.clone();
    let Some(mut shoot) = state.shoot.clone() else {
        return Ok(finish_ready(state));
    };
    let seed_name = shoot.seed_name().map(str::to_string);

    let (Some(seed_name), false) = (seed_name, tenant_config_path.is_empty()) else {
        debug!(
            runtime = %state.instance.name_any(),
            "Cannot enable audit log: seed or tenant configuration unknown"
        );
        return Ok(finish_ready(state));
    };

    match prepare_audit_log(m, &mut shoot, &seed_name, Path::new(&tenant_config_path)).await {
        Ok(true) => {
            let patch = audit_log_patch(&shoot);
            let updated = m
                .ctx
                .shoots()
                .patch(&shoot.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
                .await
                .with_context(|| format!("failed to update audit log of shoot {}", shoot.name_any()))?;
            info!(runtime = %state.instance.name_any(), shoot = %updated.name_any(), "Configured audit log");
            state.shoot = Some(updated);
            state.status().set_pending(
                CONDITION_TYPE_AUDIT_LOG_CONFIGURED,
                CONDITION_STATUS_TRUE,
                REASON_AUDIT_LOG_CONFIGURED,
                "Audit log configured, waiting for shoot reconcile",
            );
            Ok(Transition::requeue(Duration::from_secs(GARDENER_REQUEUE_DURATION_SECS)))
        }
        Ok(false) => {
            state.status().set_condition(
                CONDITION_TYPE_AUDIT_LOG_CONFIGURED,
                CONDITION_STATUS_TRUE,
                REASON_AUDIT_LOG_CONFIGURED,
                "Audit log configured",
            );
            Ok(finish_ready(state))
        }
        Err(e) => {
            metrics::record_error(KIND_RUNTIME, REASON_AUDIT_LOG_ERROR);
            warn!(
                runtime = %state.instance.name_any(),
                error = %e,
                mandatory = m.ctx.settings.audit_log_mandatory,
                "Audit log configuration failed"
            );
            let message = format!("Failed to configure audit log: {e}");
            Ok(audit_log_failed(
                state,
                &message,
                m.ctx.settings.audit_log_mandatory,
            ))
        }
    }
}

/// Records a failed audit log configuration.
///
/// A mandatory audit log keeps the runtime Pending and retries; otherwise the
/// failure stays visible on the condition and the runtime becomes Ready.
pub(super) fn audit_log_failed(state: &mut SystemState, message: &str, mandatory: bool) -> Transition {
    if mandatory {
        state.status().set_pending(
            CONDITION_TYPE_AUDIT_LOG_CONFIGURED,
            CONDITION_STATUS_FALSE,
            REASON_AUDIT_LOG_ERROR,
            message,
        );
        return Transition::requeue(Duration::from_secs(AUDIT_LOG_RETRY_DURATION_SECS));
    }

    state.status().set_condition(
        CONDITION_TYPE_AUDIT_LOG_CONFIGURED,
        CONDITION_STATUS_FALSE,
        REASON_AUDIT_LOG_ERROR,
        message,
    );
    finish_ready(state)
}

#[cfg(test)]
#[path = "configuration_tests.rs"]
mod configuration_tests;
