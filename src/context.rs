// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for both controllers.
//!
//! Every reconciler receives an `Arc<Context>` holding:
//! - the management cluster client (Runtimes, `GardenerClusters`, Secrets)
//! - the Gardener client (Shoots, Seeds) and the admin kubeconfig provider
//! - the converter configuration loaded at boot
//! - process level settings taken from command line flags

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Result};
use kube::runtime::events::{Recorder, Reporter};
use kube::{Api, Client};

use crate::config::Config;
use crate::constants::{
    DEFAULT_GARDENER_REQUEST_TIMEOUT_SECS, DEFAULT_ROTATION_PERIOD_SECS, DEFAULT_ROTATION_RATIO,
    EVENT_REPORTER,
};
use crate::converter::Converter;
use crate::gardener::kubeconfig::KubeconfigProvider;
use crate::gardener::{Seed, Shoot};

/// Shared context passed to all controllers.
#[derive(Clone)]
pub struct Context {
    /// Management cluster client
    pub client: Client,

    /// Client for the Gardener project cluster
    pub gardener_client: Client,

    /// Source of admin kubeconfigs for shoots
    pub kubeconfig_provider: Arc<dyn KubeconfigProvider>,

    /// Configuration file contents
    pub config: Arc<Config>,

    /// Flags
    pub settings: Settings,

    /// Reporter used for Kubernetes events
    pub reporter: Reporter,
}

impl Context {
    #[must_use]
    pub fn new(
        client: Client,
        gardener_client: Client,
        kubeconfig_provider: Arc<dyn KubeconfigProvider>,
        config: Config,
        settings: Settings,
    ) -> Self {
        Self {
            client,
            gardener_client,
            kubeconfig_provider,
            config: Arc::new(config),
            settings,
            reporter: Reporter {
                controller: EVENT_REPORTER.to_string(),
                instance: std::env::var("POD_NAME").ok(),
            },
        }
    }

    /// Namespace holding all shoots of the configured project.
    #[must_use]
    pub fn project_namespace(&self) -> String {
        self.config.converter.project_namespace()
    }

    /// Shoots of the configured Gardener project.
    #[must_use]
    pub fn shoots(&self) -> Api<Shoot> {
        Api::namespaced(self.gardener_client.clone(), &self.project_namespace())
    }

    #[must_use]
    pub fn seeds(&self) -> Api<Seed> {
        Api::all(self.gardener_client.clone())
    }

    #[must_use]
    pub fn converter(&self) -> Converter {
        Converter::new(self.config.converter.clone())
    }

    #[must_use]
    pub fn recorder(&self) -> Recorder {
        Recorder::new(self.client.clone(), self.reporter.clone())
    }
}

/// Process level settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub rotation: RotationSettings,

    /// Deadline for a single reconciliation
    pub gardener_request_timeout: Duration,

    /// Directory receiving shoot and runtime dumps
    pub persist_shoot_path: Option<PathBuf>,

    /// Whether audit log failures block a runtime from becoming ready
    pub audit_log_mandatory: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rotation: RotationSettings::default(),
            gardener_request_timeout: Duration::from_secs(DEFAULT_GARDENER_REQUEST_TIMEOUT_SECS),
            persist_shoot_path: None,
            audit_log_mandatory: true,
        }
    }
}

/// Kubeconfig rotation parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationSettings {
    /// Intended kubeconfig lifetime
    pub period: Duration,

    /// Fraction of `period` after which a kubeconfig is rotated
    pub ratio: f64,

    /// Shortest requeue the controller schedules while waiting for rotation
    pub minimal_rotation_time: Duration,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(DEFAULT_ROTATION_PERIOD_SECS),
            ratio: DEFAULT_ROTATION_RATIO,
            minimal_rotation_time: Duration::from_secs(1),
        }
    }
}

impl RotationSettings {
    /// # Errors
    ///
    /// Fails unless `ratio` lies in `(0, 1)` and `period` is non-zero.
    pub fn new(period: Duration, ratio: f64, minimal_rotation_time: Duration) -> Result<Self> {
        ensure!(
            ratio > 0.0 && ratio < 1.0,
            "rotation ratio must be in (0, 1), got {ratio}"
        );
        ensure!(!period.is_zero(), "rotation period must be positive");
        Ok(Self {
            period,
            ratio,
            minimal_rotation_time,
        })
    }

    /// Age after which a kubeconfig must be rotated.
    #[must_use]
    pub fn threshold(&self) -> Duration {
        self.period.mul_f64(self.ratio)
    }

    /// Lifetime requested from Gardener, so the issued kubeconfig outlives the next rotation.
    #[must_use]
    pub fn expiration_seconds(&self) -> i64 {
        i64::try_from(self.period.as_secs()).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
