// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Controller configuration file.
//!
//! The file is JSON, read once at startup:
//!
//! ```json
//! {
//!   "converter": {
//!     "kubernetes": {
//!       "defaultVersion": "1.30",
//!       "enableKubernetesVersionAutoUpdate": true,
//!       "enableMachineImageVersionAutoUpdate": false,
//!       "defaultOperatorOidc": {
//!         "clientID": "operator", "groupsClaim": "groups",
//!         "issuerURL": "https://operator.example.com", "signingAlgs": ["RS256"],
//!         "usernameClaim": "sub", "usernamePrefix": "-"
//!       }
//!     },
//!     "dns": { "secretName": "dns-secret", "domainPrefix": "dev.kyma.example", "providerType": "aws-route53" },
//!     "provider": { "aws": { "enableIMDSv2": true } },
//!     "machineImage": { "defaultName": "gardenlinux", "defaultVersion": "1592.1.0" },
//!     "gardener": { "projectName": "kyma-dev" },
//!     "auditLogging": { "policyConfigMapName": "policy-config-map", "tenantConfigPath": "/config/tenants.json" }
//!   },
//!   "cluster": { "defaultSharedIASTenant": { "clientID": "...", "issuerURL": "..." } }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::GARDENER_PROJECT_NAMESPACE_PREFIX;
use crate::gardener::OidcConfig;

/// Root of the configuration file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub converter: ConverterConfig,

    #[serde(default)]
    pub cluster: ClusterConfig,
}

/// Settings consumed by the Runtime to Shoot conversion.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverterConfig {
    pub kubernetes: KubernetesConfig,
    pub dns: DnsConfig,
    pub provider: ProviderConfig,
    pub machine_image: MachineImageConfig,
    pub gardener: GardenerConfig,
    pub audit_logging: AuditLogConfig,

    /// Copied from `cluster.defaultSharedIASTenant` when the file is loaded.
    #[serde(skip)]
    pub default_shared_ias_tenant: Option<OidcProviderConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesConfig {
    pub default_version: String,
    pub enable_kubernetes_version_auto_update: bool,
    pub enable_machine_image_version_auto_update: bool,
    pub default_operator_oidc: OidcProviderConfig,
}

/// An OIDC identity provider used when a Runtime brings none.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcProviderConfig {
    #[serde(rename = "clientID")]
    pub client_id: String,

    #[serde(default)]
    pub groups_claim: String,

    #[serde(default)]
    pub groups_prefix: String,

    #[serde(rename = "issuerURL")]
    pub issuer_url: String,

    #[serde(default)]
    pub signing_algs: Vec<String>,

    #[serde(default)]
    pub username_claim: String,

    #[serde(default)]
    pub username_prefix: String,
}

impl OidcProviderConfig {
    /// Renders the provider as a shoot API server OIDC config.
    #[must_use]
    pub fn to_oidc_config(&self) -> OidcConfig {
        fn non_empty(value: &str) -> Option<String> {
            (!value.is_empty()).then(|| value.to_string())
        }

        OidcConfig {
            client_id: non_empty(&self.client_id),
            groups_claim: non_empty(&self.groups_claim),
            groups_prefix: non_empty(&self.groups_prefix),
            issuer_url: non_empty(&self.issuer_url),
            signing_algs: (!self.signing_algs.is_empty()).then(|| self.signing_algs.clone()),
            username_claim: non_empty(&self.username_claim),
            username_prefix: non_empty(&self.username_prefix),
            ..OidcConfig::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsConfig {
    pub secret_name: String,
    pub domain_prefix: String,
    pub provider_type: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub aws: AwsConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(rename = "enableIMDSv2", default)]
    pub enable_imdsv2: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineImageConfig {
    pub default_name: String,
    pub default_version: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GardenerConfig {
    pub project_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogConfig {
    #[serde(default)]
    pub policy_config_map_name: String,

    #[serde(default)]
    pub tenant_config_path: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    #[serde(
        rename = "defaultSharedIASTenant",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_shared_ias_tenant: Option<OidcProviderConfig>,
}

impl Config {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON of the expected shape.
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut config: Config =
            serde_json::from_str(raw).context("Failed to parse converter configuration")?;
        config.converter.default_shared_ias_tenant = config.cluster.default_shared_ias_tenant.clone();
        Ok(config)
    }

    /// Reads and parses the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_json(&raw)
    }
}

impl ConverterConfig {
    /// Gardener project namespace holding the shoots (`garden-<projectName>`).
    #[must_use]
    pub fn project_namespace(&self) -> String {
        format!("{GARDENER_PROJECT_NAMESPACE_PREFIX}{}", self.gardener.project_name)
    }

    /// OIDC provider applied when a Runtime defines neither client ID nor issuer.
    ///
    /// The shared IAS tenant wins when configured.
    #[must_use]
    pub fn default_oidc(&self) -> &OidcProviderConfig {
        self.default_shared_ias_tenant
            .as_ref()
            .unwrap_or(&self.kubernetes.default_operator_oidc)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
