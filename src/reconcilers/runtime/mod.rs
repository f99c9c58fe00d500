// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `Runtime` reconciliation.
//!
//! Each reconciliation runs the state machine in [`fsm`] once, bounded by the
//! configured request timeout. Post-provisioning steps talk to the workload
//! cluster through a short-lived admin kubeconfig.

pub mod auditlog;
mod configuration;
mod deletion;
pub mod fsm;
pub mod oidc;
pub mod persist;
mod provisioning;
pub mod rbac;

use std::sync::Arc;

use anyhow::Result;
use kube::runtime::controller::Action;
use kube::ResourceExt;
use tracing::debug;

use self::fsm::{Machine, SystemState};
use crate::context::Context;
use crate::crd::Runtime;

pub use self::provisioning::{build_gardener_cluster, runtime_generation_changed};

/// Reconciles one `Runtime`.
///
/// # Errors
///
/// Returns an error on transient failures; the controller's error policy requeues.
pub async fn reconcile_runtime(runtime: Arc<Runtime>, ctx: Arc<Context>) -> Result<Action> {
    debug!(runtime = %runtime.name_any(), "Reconciling Runtime");

    let timeout = ctx.settings.gardener_request_timeout;
    let machine = Machine::new(ctx, timeout);
    let mut state = SystemState::new(runtime.as_ref().clone());
    machine.run(&mut state).await
}
