// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! GCP provider configuration.

use serde::{Deserialize, Serialize};

use crate::errors::ConversionError;

pub const API_VERSION: &str = "gcp.provider.extensions.gardener.cloud/v1alpha1";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureConfig {
    pub api_version: String,
    pub kind: String,
    pub networks: Networks,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Networks {
    pub workers: String,

    /// Deprecated alias of `workers`, still read by older extension versions.
    pub worker: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneConfig {
    pub api_version: String,
    pub kind: String,
    pub zone: String,
}

#[must_use]
pub fn infrastructure_config(workers_cidr: &str) -> InfrastructureConfig {
    InfrastructureConfig {
        api_version: API_VERSION.to_string(),
        kind: "InfrastructureConfig".to_string(),
        networks: Networks {
            workers: workers_cidr.to_string(),
            worker: workers_cidr.to_string(),
        },
    }
}

/// Control plane pinned to the first worker zone.
///
/// # Errors
///
/// Returns [`ConversionError::EmptyZones`] when no zone is given.
pub fn control_plane_config(zones: &[String]) -> Result<ControlPlaneConfig, ConversionError> {
    let zone = zones.first().ok_or_else(|| ConversionError::EmptyZones {
        provider: "gcp".to_string(),
    })?;

    Ok(ControlPlaneConfig {
        api_version: API_VERSION.to_string(),
        kind: "ControlPlaneConfig".to_string(),
        zone: zone.clone(),
    })
}

#[cfg(test)]
#[path = "gcp_tests.rs"]
mod gcp_tests;
