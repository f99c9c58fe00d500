// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the infrastructure manager.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Resource Kinds
// ============================================================================

/// Kind name for `Runtime` resource
pub const KIND_RUNTIME: &str = "Runtime";

/// Kind name for `GardenerCluster` resource
pub const KIND_GARDENER_CLUSTER: &str = "GardenerCluster";

/// Kind name for Gardener `Shoot` resource
pub const KIND_SHOOT: &str = "Shoot";

/// Gardener authentication API version (admin kubeconfig requests, OIDC)
pub const GARDENER_AUTHENTICATION_API_VERSION: &str = "authentication.gardener.cloud/v1alpha1";

// ============================================================================
// Gardener Constants
// ============================================================================

/// Prefix of the Gardener project namespace (`garden-<projectName>`)
pub const GARDENER_PROJECT_NAMESPACE_PREFIX: &str = "garden-";

/// Field manager used for server-side apply of shoots
pub const FIELD_MANAGER: &str = "kim";

/// Subresource that mints short-lived admin kubeconfigs
pub const ADMIN_KUBECONFIG_SUBRESOURCE: &str = "adminkubeconfig";

/// Gardener error code reported when infrastructure rate limits were hit
pub const ERROR_INFRA_RATE_LIMITS_EXCEEDED: &str = "ERR_INFRA_RATE_LIMITS_EXCEEDED";

/// Default networking type of provisioned shoots
pub const DEFAULT_NETWORKING_TYPE: &str = "calico";

/// Region requiring the KSA assured-workload toleration
pub const KSA_REGION: &str = "me-central2";

/// Toleration key for KSA assured workloads
pub const KSA_TOLERATION_KEY: &str = "ksa-assured-workload";

/// Exposure class used by OpenStack shoots
pub const OPENSTACK_EXPOSURE_CLASS_NAME: &str = "converged-cloud-internet";

/// Platform regions enforcing EU access for cluster nodes
pub const EU_ACCESS_PLATFORM_REGIONS: [&str; 2] = ["cf-eu11", "cf-ch20"];

// ============================================================================
// Shoot Extension Types
// ============================================================================

/// DNS service extension
pub const EXTENSION_DNS: &str = "shoot-dns-service";

/// OIDC service extension
pub const EXTENSION_OIDC: &str = "shoot-oidc-service";

/// Egress network filter extension
pub const EXTENSION_NETWORK_FILTER: &str = "shoot-networking-filter";

/// Certificate service extension
pub const EXTENSION_CERT: &str = "shoot-cert-service";

/// Audit log service extension
pub const EXTENSION_AUDIT_LOG: &str = "shoot-auditlog-service";

// ============================================================================
// Audit Log Constants
// ============================================================================

/// Name of the shoot resource reference holding audit log credentials
pub const AUDIT_LOG_SECRET_REFERENCE: &str = "auditlog-credentials";

/// API version of the audit log extension provider config
pub const AUDIT_LOG_CONFIG_API_VERSION: &str = "service.auditlog.extensions.gardener.cloud/v1alpha1";

/// Kind of the audit log extension provider config
pub const AUDIT_LOG_CONFIG_KIND: &str = "AuditlogConfig";

/// Audit log extension type
pub const AUDIT_LOG_TYPE: &str = "standard";

// ============================================================================
// Kubeconfig Rotation Constants
// ============================================================================

/// Default fraction of the rotation period after which a kubeconfig is rotated
pub const DEFAULT_ROTATION_RATIO: f64 = 0.95;

/// Default kubeconfig rotation period (24 hours)
pub const DEFAULT_ROTATION_PERIOD_SECS: u64 = 86_400;

/// Default timeout for a single kubeconfig reconciliation (60 seconds)
pub const DEFAULT_GARDENER_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default data key of the kubeconfig inside the managed Secret
pub const DEFAULT_KUBECONFIG_KEY: &str = "config";

/// Prefix of kubeconfig Secret names created for runtimes
pub const KUBECONFIG_SECRET_NAME_PREFIX: &str = "kubeconfig-";

/// Lifetime of admin kubeconfigs fetched for post-provisioning steps (10 minutes)
pub const POST_PROVISIONING_KUBECONFIG_EXPIRATION_SECS: i64 = 600;

// ============================================================================
// Controller Requeue Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue while waiting for Gardener operations (15 seconds)
pub const GARDENER_REQUEUE_DURATION_SECS: u64 = 15;

/// Requeue while waiting for shoot reconciliation after a patch (30 seconds)
pub const SHOOT_RECONCILE_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue after a runtime has been fully configured (5 minutes)
pub const READY_REQUEUE_DURATION_SECS: u64 = 300;

/// Requeue while waiting for the companion `GardenerCluster` to disappear (5 seconds)
pub const KUBECONFIG_DELETION_REQUEUE_DURATION_SECS: u64 = 5;

/// Requeue after an audit log configuration failure (1 minute)
pub const AUDIT_LOG_RETRY_DURATION_SECS: u64 = 60;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Reporter name used for Kubernetes events
pub const EVENT_REPORTER: &str = "infrastructure-manager";

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for Prometheus metrics HTTP server
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
