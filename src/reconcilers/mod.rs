// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation controllers.
//!
//! # Available Reconcilers
//!
//! - [`reconcile_runtime`] - drives a `Runtime` through the shoot lifecycle:
//!   create, patch, wait, post-provisioning (OIDC, admin bindings, audit log)
//!   and deletion
//! - [`reconcile_gardener_cluster`] - keeps the kubeconfig Secret of a
//!   `GardenerCluster` present and rotated
//!
//! Both follow the standard controller pattern: read the desired state, compare
//! it with what exists, converge, then report the result in the status
//! subresource.

pub mod finalizers;
pub mod gardenercluster;
pub mod retry;
pub mod runtime;
pub mod status;

pub use gardenercluster::reconcile_gardener_cluster;
pub use runtime::reconcile_runtime;
