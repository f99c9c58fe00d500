// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! YAML dumps of converted shoots and their Runtimes, for auditing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use kube::ResourceExt;
use tracing::{debug, warn};

use super::fsm::{Machine, SystemState, Transition};
use crate::constants::GARDENER_REQUEUE_DURATION_SECS;
use crate::crd::Runtime;
use crate::gardener::Shoot;

/// Writes `<namespace>-<runtime>-shoot.yaml` and `<namespace>-<runtime>-runtime.yaml` into `dir`.
///
/// # Errors
///
/// Returns an error if serialization or a write fails.
pub fn write_dumps(dir: &Path, runtime: &Runtime, shoot: &Shoot) -> Result<(PathBuf, PathBuf)> {
    let prefix = format!(
        "{}-{}",
        runtime.namespace().unwrap_or_default(),
        runtime.name_any()
    );
    let shoot_path = dir.join(format!("{prefix}-shoot.yaml"));
    let runtime_path = dir.join(format!("{prefix}-runtime.yaml"));

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    std::fs::write(&shoot_path, serde_yaml::to_string(shoot)?)
        .with_context(|| format!("failed to write {}", shoot_path.display()))?;
    std::fs::write(&runtime_path, serde_yaml::to_string(runtime)?)
        .with_context(|| format!("failed to write {}", runtime_path.display()))?;

    Ok((shoot_path, runtime_path))
}

pub(super) fn persist_shoot(m: &Machine, state: &mut SystemState) -> Result<Transition> {
    let next = Transition::requeue(Duration::from_secs(GARDENER_REQUEUE_DURATION_SECS));
    let (Some(dir), Some(shoot)) = (&m.ctx.settings.persist_shoot_path, &state.shoot) else {
        return Ok(next);
    };

    match write_dumps(dir, &state.instance, shoot) {
        Ok((shoot_path, _)) => {
            debug!(runtime = %state.instance.name_any(), path = %shoot_path.display(), "Persisted shoot");
        }
        Err(e) => {
            warn!(runtime = %state.instance.name_any(), error = %format!("{e:#}"), "Failed to persist shoot");
        }
    }
    Ok(next)
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod persist_tests;
