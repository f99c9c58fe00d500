// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Audit log configuration of a shoot.
//!
//! The tenant file maps `seed provider type -> shoot region -> tenant`:
//!
//! ```json
//! {
//!   "aws": {
//!     "eu-central-1": {
//!       "tenantID": "79c64792-9c1e-4c1b-9941-ef7560dd3eae",
//!       "serviceURL": "https://auditlog.example.com:8081",
//!       "secretName": "auditlog-secret"
//!     }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::constants::{
    AUDIT_LOG_CONFIG_API_VERSION, AUDIT_LOG_CONFIG_KIND, AUDIT_LOG_SECRET_REFERENCE,
    AUDIT_LOG_TYPE, EXTENSION_AUDIT_LOG,
};
use crate::converter::extenders::upsert_extension;
use crate::errors::AuditLogError;
use crate::gardener::{
    AuditConfig, AuditPolicy, CrossVersionObjectReference, Extension, KubeApiServerConfig,
    LocalObjectReference, NamedResourceReference, Shoot,
};

/// Audit log tenant of one provider region.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantConfig {
    #[serde(rename = "tenantID")]
    pub tenant_id: String,

    #[serde(rename = "serviceURL")]
    pub service_url: String,

    #[serde(rename = "secretName")]
    pub secret_name: String,
}

/// Tenants indexed by provider type, then region.
pub type TenantConfigs = HashMap<String, HashMap<String, TenantConfig>>;

/// Reads the tenant file.
///
/// # Errors
///
/// Returns an error if the file is missing or not valid JSON.
pub fn load_tenant_configs(path: &Path) -> Result<TenantConfigs, AuditLogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| AuditLogError::TenantConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| AuditLogError::TenantConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Looks up the tenant for a provider type and region.
///
/// # Errors
///
/// Returns [`AuditLogError::MissingMapping`] when either key is absent.
pub fn tenant_for<'a>(
    configs: &'a TenantConfigs,
    provider_type: &str,
    region: &str,
) -> Result<&'a TenantConfig, AuditLogError> {
    configs
        .get(provider_type)
        .and_then(|regions| regions.get(region))
        .ok_or_else(|| AuditLogError::MissingMapping {
            provider_type: provider_type.to_string(),
            region: region.to_string(),
        })
}

/// Writes the audit log extension, credentials reference and policy onto `shoot`.
///
/// Returns `true` when the shoot changed.
pub fn apply_audit_log(shoot: &mut Shoot, tenant: &TenantConfig, policy_config_map_name: &str) -> bool {
    let before = shoot.spec.clone();

    upsert_extension(
        shoot,
        Extension {
            r#type: EXTENSION_AUDIT_LOG.to_string(),
            provider_config: Some(json!({
                "apiVersion": AUDIT_LOG_CONFIG_API_VERSION,
                "kind": AUDIT_LOG_CONFIG_KIND,
                "type": AUDIT_LOG_TYPE,
                "tenantID": tenant.tenant_id,
                "serviceURL": tenant.service_url,
                "secretReferenceName": AUDIT_LOG_SECRET_REFERENCE,
            })),
            disabled: None,
        },
    );

    let reference = NamedResourceReference {
        name: AUDIT_LOG_SECRET_REFERENCE.to_string(),
        resource_ref: CrossVersionObjectReference {
            api_version: "v1".to_string(),
            kind: "Secret".to_string(),
            name: tenant.secret_name.clone(),
        },
    };
    let resources = shoot.spec.resources.get_or_insert_with(Vec::new);
    match resources.iter_mut().find(|r| r.name == AUDIT_LOG_SECRET_REFERENCE) {
        Some(existing) => *existing = reference,
        None => resources.push(reference),
    }

    if !policy_config_map_name.is_empty() {
        shoot
            .spec
            .kubernetes
            .kube_api_server
            .get_or_insert_with(KubeApiServerConfig::default)
            .audit_config = Some(AuditConfig {
            audit_policy: Some(AuditPolicy {
                config_map_ref: Some(LocalObjectReference {
                    name: policy_config_map_name.to_string(),
                }),
            }),
        });
    }

    shoot.spec != before
}

/// Merge patch carrying only what [`apply_audit_log`] writes.
///
/// Merge patches replace lists, so the full extension and resource lists of
/// `shoot` are sent. Every other field of the live shoot is left alone.
#[must_use]
pub fn audit_log_patch(shoot: &Shoot) -> Value {
    let mut spec = json!({
        "extensions": shoot.spec.extensions,
        "resources": shoot.spec.resources,
    });

    let audit_config = shoot
        .spec
        .kubernetes
        .kube_api_server
        .as_ref()
        .and_then(|server| server.audit_config.as_ref());
    if let Some(audit_config) = audit_config {
        spec["kubernetes"] = json!({ "kubeAPIServer": { "auditConfig": audit_config } });
    }

    json!({ "spec": spec })
}

#[cfg(test)]
#[path = "auditlog_tests.rs"]
mod auditlog_tests;
