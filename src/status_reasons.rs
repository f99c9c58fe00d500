// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition types and reasons.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a condition
//! has a particular status.
//!
//! # Runtime Conditions
//!
//! A `Runtime` carries one condition per lifecycle concern:
//!
//! ```yaml
//! status:
//!   state: Ready
//!   conditions:
//!     - type: Provisioned
//!       status: "True"
//!       reason: ShootCreationCompleted
//!       message: "Shoot creation completed"
//!     - type: KubeconfigReady
//!       status: "True"
//!       reason: GardenerClusterReady
//!     - type: OidcConfigured
//!       status: "True"
//!       reason: OidcConfigured
//!     - type: Configured
//!       status: "True"
//!       reason: ConfigurationCompleted
//!     - type: AuditLogConfigured
//!       status: "True"
//!       reason: AuditLogConfigured
//! ```
//!
//! # GardenerCluster Conditions
//!
//! A `GardenerCluster` carries a single `Ready` condition whose reason names the
//! last kubeconfig Secret operation.

// ============================================================================
// Condition Status Values
// ============================================================================

pub const CONDITION_STATUS_TRUE: &str = "True";
pub const CONDITION_STATUS_FALSE: &str = "False";
pub const CONDITION_STATUS_UNKNOWN: &str = "Unknown";

// ============================================================================
// Runtime Condition Types
// ============================================================================

/// The shoot exists and Gardener finished creating or reconciling it.
pub const CONDITION_TYPE_PROVISIONED: &str = "Provisioned";

/// The companion `GardenerCluster` exists and its kubeconfig Secret is populated.
pub const CONDITION_TYPE_KUBECONFIG_READY: &str = "KubeconfigReady";

/// Post-provisioning configuration (role bindings) is applied.
pub const CONDITION_TYPE_CONFIGURED: &str = "Configured";

/// OpenIDConnect resources are installed on the workload cluster.
pub const CONDITION_TYPE_OIDC_CONFIGURED: &str = "OidcConfigured";

/// The shoot carries the audit log extension and credentials reference.
pub const CONDITION_TYPE_AUDIT_LOG_CONFIGURED: &str = "AuditLogConfigured";

// ============================================================================
// Runtime Condition Reasons
// ============================================================================

pub const REASON_INITIALIZED: &str = "Initialized";

/// Shoot was submitted and Gardener is still creating it.
pub const REASON_SHOOT_CREATION_PENDING: &str = "ShootCreationPending";

pub const REASON_SHOOT_CREATION_COMPLETED: &str = "ShootCreationCompleted";

/// Shoot was patched and Gardener is reconciling it.
pub const REASON_PROCESSING: &str = "Processing";

/// A call to the Gardener API failed.
pub const REASON_GARDENER_ERROR: &str = "GardenerErr";

/// The Runtime could not be converted into a shoot. Terminal.
pub const REASON_CONVERSION_ERROR: &str = "ConversionError";

/// A call to the management cluster API failed.
pub const REASON_KUBERNETES_API_ERROR: &str = "KubernetesErr";

pub const REASON_CONFIGURATION_COMPLETED: &str = "ConfigurationCompleted";

/// Applying role bindings on the workload cluster failed.
pub const REASON_CONFIGURATION_ERROR: &str = "ConfigurationErr";

pub const REASON_OIDC_CONFIGURED: &str = "OidcConfigured";

pub const REASON_OIDC_ERROR: &str = "OidcError";

pub const REASON_AUDIT_LOG_CONFIGURED: &str = "AuditLogConfigured";

/// Audit log configuration failed or no tenant mapping exists.
pub const REASON_AUDIT_LOG_ERROR: &str = "AuditLogError";

pub const REASON_GARDENER_CLUSTER_READY: &str = "GardenerClusterReady";

pub const REASON_GARDENER_CLUSTER_ERROR: &str = "GardenerClusterErr";

/// The Runtime is being deleted.
pub const REASON_DELETION: &str = "Deletion";

pub const REASON_DELETION_ERROR: &str = "DeletionErr";

// ============================================================================
// GardenerCluster Condition Type and Reasons
// ============================================================================

pub const CONDITION_TYPE_READY: &str = "Ready";

pub const REASON_KUBECONFIG_SECRET_CREATED: &str = "KubeconfigSecretCreated";
pub const REASON_KUBECONFIG_SECRET_ROTATED: &str = "KubeconfigSecretRotated";
pub const REASON_KUBECONFIG_SECRET_REVOKED: &str = "KubeconfigSecretRevoked";
pub const REASON_KUBECONFIG_SECRET_UP_TO_DATE: &str = "KubeconfigSecretUpToDate";
pub const REASON_FAILED_TO_GET_KUBECONFIG: &str = "FailedToGetKubeconfig";
pub const REASON_FAILED_TO_CREATE_SECRET: &str = "FailedToCreateSecret";
pub const REASON_FAILED_TO_UPDATE_SECRET: &str = "FailedToUpdateSecret";
pub const REASON_FAILED_TO_DELETE_SECRET: &str = "FailedToDeleteSecret";
pub const REASON_FAILED_TO_GET_SECRET: &str = "FailedToGetSecret";

#[cfg(test)]
#[path = "status_reasons_tests.rs"]
mod status_reasons_tests;
