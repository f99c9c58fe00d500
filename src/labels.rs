// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label and annotation constants used across all reconcilers.
//!
//! Every relation between runtimes, shoots, clusters and kubeconfig secrets is
//! resolved through these keys rather than through object references.

// ============================================================================
// Runtime Identity Labels
// ============================================================================

/// Global account owning the runtime
pub const LABEL_GLOBAL_ACCOUNT_ID: &str = "kyma-project.io/global-account-id";

/// Subaccount owning the runtime
pub const LABEL_SUBACCOUNT_ID: &str = "kyma-project.io/subaccount-id";

/// Stable runtime identifier
pub const LABEL_RUNTIME_ID: &str = "kyma-project.io/runtime-id";

/// Service instance the runtime was provisioned for
pub const LABEL_INSTANCE_ID: &str = "kyma-project.io/instance-id";

/// Broker plan identifier
pub const LABEL_BROKER_PLAN_ID: &str = "kyma-project.io/broker-plan-id";

/// Broker plan name
pub const LABEL_BROKER_PLAN_NAME: &str = "kyma-project.io/broker-plan-name";

/// Name of the Gardener shoot backing the runtime
pub const LABEL_SHOOT_NAME: &str = "kyma-project.io/shoot-name";

/// Hyperscaler region
pub const LABEL_REGION: &str = "kyma-project.io/region";

/// Platform (BTP) region
pub const LABEL_PLATFORM_REGION: &str = "kyma-project.io/platform-region";

/// Name of the Kyma resource installed on the runtime
pub const LABEL_KYMA_NAME: &str = "operator.kyma-project.io/kyma-name";

/// Identity labels copied from runtimes to clusters and from clusters to secrets
pub const IDENTITY_LABELS: [&str; 10] = [
    LABEL_GLOBAL_ACCOUNT_ID,
    LABEL_SUBACCOUNT_ID,
    LABEL_RUNTIME_ID,
    LABEL_INSTANCE_ID,
    LABEL_BROKER_PLAN_ID,
    LABEL_BROKER_PLAN_NAME,
    LABEL_SHOOT_NAME,
    LABEL_REGION,
    LABEL_PLATFORM_REGION,
    LABEL_KYMA_NAME,
];

/// Present with value `true` on runtimes translated from legacy records
pub const LABEL_CREATED_BY_MIGRATOR: &str = "operator.kyma-project.io/created-by-migrator";

// ============================================================================
// Kubeconfig Secret Labels
// ============================================================================

/// Marks secrets managed by this controller
pub const LABEL_MANAGED_BY: &str = "operator.kyma-project.io/managed-by";

/// Value of [`LABEL_MANAGED_BY`]
pub const MANAGED_BY_INFRASTRUCTURE_MANAGER: &str = "infrastructure-manager";

/// Name of the `GardenerCluster` a secret belongs to
pub const LABEL_CLUSTER_NAME: &str = "operator.kyma-project.io/cluster-name";

// ============================================================================
// Workload Cluster Labels
// ============================================================================

/// Application label on managed cluster role bindings
pub const LABEL_APP: &str = "app";

/// Value of [`LABEL_APP`]
pub const APP_KYMA: &str = "kyma";

/// Marks cluster role bindings and OIDC resources managed by this controller
pub const LABEL_RECONCILER_MANAGED_BY: &str = "reconciler.kyma-project.io/managed-by";

// ============================================================================
// Shoot Labels
// ============================================================================

/// Global account label on shoots
pub const SHOOT_LABEL_ACCOUNT: &str = "account";

/// Subaccount label on shoots
pub const SHOOT_LABEL_SUBACCOUNT: &str = "subaccount";

// ============================================================================
// Annotations
// ============================================================================

/// Presence on a `GardenerCluster` forces kubeconfig rotation
pub const ANNOTATION_FORCE_KUBECONFIG_ROTATION: &str =
    "operator.kyma-project.io/force-kubeconfig-rotation";

/// RFC3339 UTC issuance time of the kubeconfig stored in a secret
pub const ANNOTATION_LAST_SYNC: &str = "operator.kyma-project.io/last-sync";

/// Required by Gardener before a shoot may be deleted
pub const ANNOTATION_DELETION_CONFIRMATION: &str = "confirmation.gardener.cloud/deletion";

/// Runtime identifier on shoots
pub const ANNOTATION_RUNTIME_ID: &str = "infrastructuremanager.kyma-project.io/runtime-id";

/// Runtime generation the shoot was converted from
pub const ANNOTATION_RUNTIME_GENERATION: &str =
    "infrastructuremanager.kyma-project.io/runtime-generation";

/// Licence type on shoots
pub const ANNOTATION_LICENCE_TYPE: &str = "infrastructuremanager.kyma-project.io/licence-type";

/// EU access policy trigger on shoots
pub const ANNOTATION_EU_ACCESS: &str = "support.gardener.cloud/eu-access-for-cluster-nodes";

// ============================================================================
// Finalizers
// ============================================================================

/// Finalizer for `Runtime` resources
pub const FINALIZER_RUNTIME: &str = "kyma-project.io/runtime-controller";

/// Finalizer for `GardenerCluster` resources
pub const FINALIZER_GARDENER_CLUSTER: &str = "infrastructuremanager.kyma-project.io/deletion-hook";
