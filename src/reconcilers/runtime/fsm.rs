// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Runtime state machine.
//!
//! A reconciliation starts in [`State::TakeSnapshot`] and steps through state
//! functions until one returns [`Transition::Done`]. Each state function may
//! mutate the in-memory Runtime status; only [`State::UpdateStatus`] writes it
//! back, and only when it differs from the snapshot taken on entry.
//!
//! ```text
//! TakeSnapshot -> Initialize -+-> CreateShoot -> [PersistShoot] -> UpdateStatus
//!                             +-> SelectShootProcessing -+-> WaitForShootCreation --+
//!                             |                          +-> WaitForShootReconcile -+-> ProcessShoot
//!                             |                          +-> PatchExistingShoot ----+        |
//!                             |                                                   ConfigureOidc
//!                             |                                                          |
//!                             |                                            ApplyClusterRoleBindings
//!                             |                                                          |
//!                             |                                       ConfigureAuditLog -> UpdateStatus
//!                             +-> DeleteKubeconfig -> DeleteShoot -> UpdateStatus
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use kube::api::{Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::runtime::events::{Event, EventType};
use kube::{Api, Client, Resource, ResourceExt};
use serde_json::json;
use tracing::{debug, warn};

use super::{configuration, deletion, persist, provisioning};
use crate::constants::KIND_RUNTIME;
use crate::context::Context;
use crate::crd::{Runtime, RuntimeState, RuntimeStatus};
use crate::gardener::Shoot;
use crate::metrics;
use crate::reconcilers::status::latest_condition;

/// States of the Runtime state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    TakeSnapshot,
    Initialize,
    CreateShoot,
    PersistShoot,
    SelectShootProcessing,
    PatchExistingShoot,
    WaitForShootCreation,
    WaitForShootReconcile,
    ProcessShoot,
    ConfigureOidc,
    ApplyClusterRoleBindings,
    ConfigureAuditLog,
    DeleteKubeconfig,
    DeleteShoot,
    UpdateStatus(Outcome),
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TakeSnapshot => "TakeSnapshot",
            Self::Initialize => "Initialize",
            Self::CreateShoot => "CreateShoot",
            Self::PersistShoot => "PersistShoot",
            Self::SelectShootProcessing => "SelectShootProcessing",
            Self::PatchExistingShoot => "PatchExistingShoot",
            Self::WaitForShootCreation => "WaitForShootCreation",
            Self::WaitForShootReconcile => "WaitForShootReconcile",
            Self::ProcessShoot => "ProcessShoot",
            Self::ConfigureOidc => "ConfigureOidc",
            Self::ApplyClusterRoleBindings => "ApplyClusterRoleBindings",
            Self::ConfigureAuditLog => "ConfigureAuditLog",
            Self::DeleteKubeconfig => "DeleteKubeconfig",
            Self::DeleteShoot => "DeleteShoot",
            Self::UpdateStatus(_) => "UpdateStatus",
        };
        f.write_str(name)
    }
}

/// How a reconciliation ends once the status is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Requeue(Duration),
    Stop,
}

impl From<Outcome> for Action {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Requeue(after) => Action::requeue(after),
            Outcome::Stop => Action::await_change(),
        }
    }
}

/// Result of a single state function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Next(State),
    Done(Action),
}

impl Transition {
    /// Persist the status, then requeue after `after`.
    #[must_use]
    pub fn requeue(after: Duration) -> Self {
        Self::Next(State::UpdateStatus(Outcome::Requeue(after)))
    }

    /// Persist the status and wait for the next change of the Runtime.
    #[must_use]
    pub fn stop() -> Self {
        Self::Next(State::UpdateStatus(Outcome::Stop))
    }
}

/// Data carried between state functions of one reconciliation.
#[derive(Clone)]
pub struct SystemState {
    /// Runtime being reconciled; its status is mutated in memory
    pub instance: Runtime,

    /// Status as observed on entry
    pub snapshot: RuntimeStatus,

    /// Companion shoot, when it exists
    pub shoot: Option<Shoot>,

    /// Client for the provisioned cluster, built on first use
    pub workload_client: Option<Client>,
}

impl SystemState {
    #[must_use]
    pub fn new(instance: Runtime) -> Self {
        Self {
            instance,
            snapshot: RuntimeStatus::default(),
            shoot: None,
            workload_client: None,
        }
    }

    pub fn status(&mut self) -> &mut RuntimeStatus {
        self.instance.status.get_or_insert_with(RuntimeStatus::default)
    }

    #[must_use]
    pub fn status_changed(&self) -> bool {
        let current = self.instance.status.clone().unwrap_or_default();
        !current.semantically_equal(&self.snapshot)
    }

    /// Runtime id label, falling back to the object name.
    #[must_use]
    pub fn runtime_id(&self) -> String {
        self.instance
            .runtime_id()
            .map_or_else(|| self.instance.name_any(), str::to_string)
    }

    #[must_use]
    pub fn shoot_name(&self) -> &str {
        &self.instance.spec.shoot.name
    }
}

/// Clients and settings shared by all state functions.
pub struct Machine {
    pub ctx: Arc<Context>,
    deadline: Instant,
}

impl Machine {
    #[must_use]
    pub fn new(ctx: Arc<Context>, timeout: Duration) -> Self {
        Self {
            ctx,
            deadline: Instant::now() + timeout,
        }
    }

    #[must_use]
    pub fn deadline_exceeded(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub(crate) fn runtimes(&self, state: &SystemState) -> Api<Runtime> {
        Api::namespaced(
            self.ctx.client.clone(),
            &state.instance.namespace().unwrap_or_default(),
        )
    }

    /// Runs the machine from [`State::TakeSnapshot`] to completion.
    ///
    /// # Errors
    ///
    /// Returns the error of the failing state function, or a deadline error.
    pub async fn run(&self, state: &mut SystemState) -> Result<Action> {
        let mut current = State::TakeSnapshot;

        loop {
            if self.deadline_exceeded() {
                bail!(
                    "reconciliation of Runtime {} exceeded its deadline in state {current}",
                    state.instance.name_any()
                );
            }

            let transition = match self.step(current, state).await {
                Ok(transition) => transition,
                Err(e) => {
                    if !matches!(current, State::TakeSnapshot | State::UpdateStatus(_)) {
                        if let Err(status_err) = self.persist_status(state).await {
                            warn!(
                                runtime = %state.instance.name_any(),
                                error = %status_err,
                                "Failed to persist status after error"
                            );
                        }
                    }
                    return Err(e);
                }
            };

            match transition {
                Transition::Next(next) => {
                    debug!(
                        runtime = %state.instance.name_any(),
                        state = %current,
                        next = %next,
                        "Runtime state transition"
                    );
                    metrics::record_fsm_transition(&current.to_string(), &next.to_string());
                    current = next;
                }
                Transition::Done(action) => {
                    debug!(runtime = %state.instance.name_any(), state = %current, "Runtime reconciliation finished");
                    return Ok(action);
                }
            }
        }
    }

    async fn step(&self, current: State, state: &mut SystemState) -> Result<Transition> {
        match current {
            State::TakeSnapshot => provisioning::take_snapshot(self, state).await,
            State::Initialize => provisioning::initialize(self, state).await,
            State::CreateShoot => provisioning::create_shoot(self, state).await,
            State::PersistShoot => persist::persist_shoot(self, state),
            State::SelectShootProcessing => Ok(provisioning::select_shoot_processing(state)),
            State::PatchExistingShoot => provisioning::patch_existing_shoot(self, state).await,
            State::WaitForShootCreation => Ok(provisioning::wait_for_shoot_creation(state)),
            State::WaitForShootReconcile => Ok(provisioning::wait_for_shoot_reconcile(state)),
            State::ProcessShoot => provisioning::process_shoot(self, state).await,
            State::ConfigureOidc => configuration::configure_oidc(self, state).await,
            State::ApplyClusterRoleBindings => {
                configuration::apply_cluster_role_bindings(self, state).await
            }
            State::ConfigureAuditLog => configuration::configure_audit_log(self, state).await,
            State::DeleteKubeconfig => deletion::delete_kubeconfig(self, state).await,
            State::DeleteShoot => deletion::delete_shoot(self, state).await,
            State::UpdateStatus(outcome) => self.update_status(state, outcome).await,
        }
    }

    async fn update_status(&self, state: &mut SystemState, outcome: Outcome) -> Result<Transition> {
        if state.status_changed() {
            self.persist_status(state).await?;
            self.publish_event(state).await;
        }

        if let Some(runtime_state) = state.instance.status.as_ref().and_then(|s| s.state) {
            metrics::set_runtime_state(
                &state.runtime_id(),
                state.shoot_name(),
                &runtime_state.to_string(),
            );
        }
        if let Outcome::Requeue(_) = outcome {
            metrics::record_reconciliation_requeue(KIND_RUNTIME, "fsm");
        }

        Ok(Transition::Done(outcome.into()))
    }

    async fn persist_status(&self, state: &mut SystemState) -> Result<()> {
        if !state.status_changed() {
            return Ok(());
        }
        let status = state.instance.status.clone().unwrap_or_default();
        let patch = json!({ "status": status });
        self.runtimes(state)
            .patch_status(
                &state.instance.name_any(),
                &PatchParams::default(),
                &Patch::Merge(&patch),
            )
            .await?;

        debug!(runtime = %state.instance.name_any(), state = ?status.state, "Updated Runtime status");
        state.snapshot = status;
        Ok(())
    }

    async fn publish_event(&self, state: &SystemState) {
        let Some(status) = state.instance.status.as_ref() else {
            return;
        };
        let runtime_state = status.state.map_or_else(String::new, |s| s.to_string());
        let (reason, message) = latest_condition(&status.conditions).map_or_else(
            || ("StatusChanged".to_string(), String::new()),
            |c| {
                (
                    c.reason.clone().unwrap_or_else(|| c.r#type.clone()),
                    c.message.clone().unwrap_or_default(),
                )
            },
        );
        let type_ = if status.state == Some(RuntimeState::Failed) {
            EventType::Warning
        } else {
            EventType::Normal
        };

        let event = Event {
            type_,
            reason,
            note: Some(format!("Runtime is {runtime_state}: {message}")),
            action: "Reconcile".to_string(),
            secondary: None,
        };
        if let Err(e) = self
            .ctx
            .recorder()
            .publish(&event, &state.instance.object_ref(&()))
            .await
        {
            warn!(runtime = %state.instance.name_any(), error = %e, "Failed to publish event");
        }
    }
}

#[cfg(test)]
#[path = "fsm_tests.rs"]
mod fsm_tests;
