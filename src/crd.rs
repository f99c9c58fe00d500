// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) owned by the infrastructure manager.
//!
//! # Resource Types
//!
//! - [`Runtime`] - desired state of one Kyma cluster, reconciled into a Gardener shoot
//! - [`GardenerCluster`] - desired state of the kubeconfig Secret of one cluster
//!
//! # Example: A Runtime
//!
//! ```yaml
//! apiVersion: infrastructuremanager.kyma-project.io/v1
//! kind: Runtime
//! metadata:
//!   name: 0b0d9f5c-0b1a-4a44-9d5e-5d2a4a0e7b21
//!   namespace: kcp-system
//!   labels:
//!     kyma-project.io/runtime-id: 0b0d9f5c-0b1a-4a44-9d5e-5d2a4a0e7b21
//!     kyma-project.io/global-account-id: ga-1
//!     kyma-project.io/subaccount-id: sa-1
//! spec:
//!   shoot:
//!     name: c-12345
//!     purpose: production
//!     region: eu-central-1
//!     platformRegion: cf-eu10
//!     secretBindingName: aws-credentials
//!     kubernetes:
//!       kubeAPIServer:
//!         oidcConfig: {}
//!     provider:
//!       type: aws
//!       workers:
//!         - name: cpu-worker-0
//!           machine: { type: m6i.large }
//!           minimum: 3
//!           maximum: 20
//!           zones: [eu-central-1a, eu-central-1b, eu-central-1c]
//!     networking:
//!       nodes: 10.250.0.0/16
//!       pods: 100.64.0.0/12
//!       services: 100.104.0.0/13
//!   security:
//!     administrators: [admin@example.com]
//!     networking:
//!       filter:
//!         egress: { enabled: false }
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gardener::{ControlPlane, OidcConfig, Worker};

/// Condition represents an observation of a resource's current state.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition, e.g. `Provisioned` or `Ready`.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

// ============================================================================
// Runtime
// ============================================================================

/// Desired state of a Kyma runtime cluster.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructuremanager.kyma-project.io",
    version = "v1",
    kind = "Runtime",
    namespaced,
    shortname = "rt",
    doc = "Runtime describes a Kyma cluster provisioned through Gardener. The controller creates, updates and deletes the matching Shoot and configures the provisioned cluster.",
    printcolumn = r#"{"name":"Shoot","type":"string","jsonPath":".spec.shoot.name"}"#,
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.state"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[kube(status = "RuntimeStatus")]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSpec {
    pub shoot: RuntimeShoot,

    #[serde(default)]
    pub security: Security,
}

/// Shoot-level settings of a Runtime.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeShoot {
    /// Name of the Gardener shoot.
    pub name: String,

    /// Gardener shoot purpose (`production`, `evaluation`, ...).
    #[serde(default)]
    pub purpose: String,

    /// BTP platform region, e.g. `cf-eu11`. Drives the EU access policy.
    #[serde(default)]
    pub platform_region: String,

    /// Hyperscaler region.
    pub region: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licence_type: Option<String>,

    /// Gardener secret binding holding the hyperscaler credentials.
    pub secret_binding_name: String,

    #[serde(default)]
    pub kubernetes: RuntimeKubernetes,

    pub provider: RuntimeProvider,

    pub networking: RuntimeNetworking,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<ControlPlane>,
}

/// Kubernetes settings of a Runtime.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeKubernetes {
    /// Kubernetes version; the configured default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(rename = "kubeAPIServer", default)]
    pub kube_api_server: RuntimeApiServer,
}

/// API server settings of a Runtime.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeApiServer {
    #[serde(default)]
    pub oidc_config: OidcConfig,

    /// Identity providers installed as OpenIDConnect resources on the cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_oidc_config: Option<Vec<OidcConfig>>,
}

/// Hyperscaler and worker pools of a Runtime.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeProvider {
    /// One of `aws`, `azure`, `gcp`, `openstack`.
    pub r#type: String,

    pub workers: Vec<Worker>,
}

/// Network ranges of a Runtime.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeNetworking {
    /// Network plugin; defaults to `calico`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    /// Worker node CIDR, subdivided per zone.
    pub nodes: String,

    pub pods: String,

    pub services: String,
}

/// Security settings of a Runtime.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    /// Users receiving a `cluster-admin` binding on the workload cluster.
    #[serde(default)]
    pub administrators: Vec<String>,

    #[serde(default)]
    pub networking: NetworkingSecurity,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkingSecurity {
    #[serde(default)]
    pub filter: Filter,
}

/// Network filter switches.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Filter {
    #[serde(default)]
    pub egress: FilterSwitch,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress: Option<FilterSwitch>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FilterSwitch {
    pub enabled: bool,
}

/// Observed state of a Runtime.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<RuntimeState>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Lifecycle state of a Runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RuntimeState {
    Pending,
    Ready,
    Failed,
    Terminating,
}

impl fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Ready => "Ready",
            Self::Failed => "Failed",
            Self::Terminating => "Terminating",
        };
        f.write_str(s)
    }
}

impl Runtime {
    /// Returns the value of a label, if set and non-empty.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata
            .labels
            .as_ref()?
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Runtime identifier from the `kyma-project.io/runtime-id` label.
    #[must_use]
    pub fn runtime_id(&self) -> Option<&str> {
        self.label(crate::labels::LABEL_RUNTIME_ID)
    }

    /// Returns `true` when the Runtime was created by the legacy migrator.
    #[must_use]
    pub fn is_created_by_migrator(&self) -> bool {
        self.label(crate::labels::LABEL_CREATED_BY_MIGRATOR) == Some("true")
    }
}

// ============================================================================
// GardenerCluster
// ============================================================================

/// Desired state of the kubeconfig Secret of a cluster.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructuremanager.kyma-project.io",
    version = "v1",
    kind = "GardenerCluster",
    namespaced,
    shortname = "gc",
    doc = "GardenerCluster requests a Secret holding a periodically rotated admin kubeconfig of a Gardener shoot.",
    printcolumn = r#"{"name":"Shoot","type":"string","jsonPath":".spec.shoot.name"}"#,
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.state"}"#
)]
#[kube(status = "GardenerClusterStatus")]
#[serde(rename_all = "camelCase")]
pub struct GardenerClusterSpec {
    pub shoot: ShootReference,
    pub kubeconfig: KubeconfigReference,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShootReference {
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KubeconfigReference {
    pub secret: SecretReference,
}

/// Location of the kubeconfig inside a Secret.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SecretReference {
    pub name: String,
    pub namespace: String,
    pub key: String,
}

/// Observed state of a GardenerCluster.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GardenerClusterStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<GardenerClusterState>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Lifecycle state of a GardenerCluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum GardenerClusterState {
    Ready,
    Processing,
    Error,
    Deleting,
}

impl fmt::Display for GardenerClusterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ready => "Ready",
            Self::Processing => "Processing",
            Self::Error => "Error",
            Self::Deleting => "Deleting",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
