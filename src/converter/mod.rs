// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Runtime to Shoot conversion.
//!
//! The [`Converter`] builds a shoot skeleton from the Runtime and then runs a
//! fixed, ordered chain of extenders. Each extender owns a set of shoot fields
//! and may only add or overwrite those. The first failing extender aborts the
//! conversion and no partial shoot is returned.

pub mod extenders;

use crate::config::ConverterConfig;
use crate::constants::DEFAULT_NETWORKING_TYPE;
use crate::crd::Runtime;
use crate::errors::ConversionError;
use crate::gardener::{Networking, Shoot, ShootSpec};

/// A single conversion step.
pub type Extender = fn(&Runtime, &mut Shoot, &ConverterConfig) -> Result<(), ConversionError>;

/// Extenders in execution order.
pub const EXTENDERS: [(&str, Extender); 12] = [
    ("annotations", extenders::extend_annotations),
    ("labels", extenders::extend_labels),
    ("kubernetes", extenders::extend_kubernetes),
    ("provider", extenders::extend_provider),
    ("dns", extenders::extend_dns),
    ("oidc", extenders::extend_oidc),
    ("cloudProfile", extenders::extend_cloud_profile),
    ("networkFilter", extenders::extend_network_filter),
    ("certConfig", extenders::extend_cert_config),
    ("exposureClassName", extenders::extend_exposure_class_name),
    ("tolerations", extenders::extend_tolerations),
    ("maintenance", extenders::extend_maintenance),
];

/// Converts Runtimes into Gardener shoots.
#[derive(Clone, Debug)]
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    #[must_use]
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Converts `runtime` into the shoot that should exist in Gardener.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing extender.
    pub fn to_shoot(&self, runtime: &Runtime) -> Result<Shoot, ConversionError> {
        let mut shoot = self.base_shoot(runtime);

        for (name, extend) in EXTENDERS {
            extend(runtime, &mut shoot, &self.config).inspect_err(|e| {
                tracing::debug!(extender = name, error = %e, "Shoot extender failed");
            })?;
        }

        Ok(shoot)
    }

    fn base_shoot(&self, runtime: &Runtime) -> Shoot {
        let spec = &runtime.spec.shoot;

        let mut shoot = Shoot::new(
            &spec.name,
            ShootSpec {
                purpose: (!spec.purpose.is_empty()).then(|| spec.purpose.clone()),
                region: spec.region.clone(),
                secret_binding_name: Some(spec.secret_binding_name.clone()),
                networking: Some(Networking {
                    r#type: Some(
                        spec.networking
                            .r#type
                            .clone()
                            .filter(|t| !t.is_empty())
                            .unwrap_or_else(|| DEFAULT_NETWORKING_TYPE.to_string()),
                    ),
                    nodes: Some(spec.networking.nodes.clone()),
                    pods: Some(spec.networking.pods.clone()),
                    services: Some(spec.networking.services.clone()),
                }),
                control_plane: spec.control_plane.clone(),
                ..ShootSpec::default()
            },
        );
        shoot.metadata.namespace = Some(self.config.project_namespace());
        shoot
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
