// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Hyperscaler-specific shoot provider configuration.
//!
//! Each supported provider emits an `InfrastructureConfig`, a
//! `ControlPlaneConfig` and, for AWS, a `WorkerConfig`. The blobs are opaque to
//! Gardener core and interpreted by the provider extensions.

pub mod aws;
pub mod azure;
pub mod cidr;
pub mod gcp;
pub mod openstack;

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::errors::ConversionError;

/// Supported infrastructure providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Provider {
    Aws,
    Azure,
    Gcp,
    OpenStack,
}

impl FromStr for Provider {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aws" => Ok(Self::Aws),
            "azure" => Ok(Self::Azure),
            "gcp" => Ok(Self::Gcp),
            "openstack" => Ok(Self::OpenStack),
            other => Err(ConversionError::UnsupportedProvider(other.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Provider {
    /// Provider type as used in `spec.provider.type`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Azure => "azure",
            Self::Gcp => "gcp",
            Self::OpenStack => "openstack",
        }
    }

    /// Gardener cloud profile used for shoots of this provider.
    #[must_use]
    pub fn cloud_profile_name(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Azure => "az",
            Self::Gcp => "gcp",
            Self::OpenStack => "converged-cloud-kyma",
        }
    }

    /// Infrastructure config for the worker CIDR and the worker zones.
    ///
    /// # Errors
    ///
    /// Fails when the CIDR is invalid or cannot hold the zones.
    pub fn infrastructure_config(
        &self,
        workers_cidr: &str,
        zones: &[String],
    ) -> Result<Value, ConversionError> {
        match self {
            Self::Aws => to_raw(
                "AWS infrastructure config",
                &aws::infrastructure_config(workers_cidr, zones)?,
            ),
            Self::Azure => to_raw(
                "Azure infrastructure config",
                &azure::infrastructure_config(workers_cidr, zones)?,
            ),
            Self::Gcp => to_raw(
                "GCP infrastructure config",
                &gcp::infrastructure_config(workers_cidr),
            ),
            Self::OpenStack => to_raw(
                "OpenStack infrastructure config",
                &openstack::infrastructure_config(workers_cidr),
            ),
        }
    }

    /// Control plane config for the worker zones.
    ///
    /// # Errors
    ///
    /// Fails for GCP when no zone is given.
    pub fn control_plane_config(&self, zones: &[String]) -> Result<Value, ConversionError> {
        match self {
            Self::Aws => to_raw("AWS control plane config", &aws::control_plane_config()),
            Self::Azure => to_raw("Azure control plane config", &azure::control_plane_config()),
            Self::Gcp => to_raw("GCP control plane config", &gcp::control_plane_config(zones)?),
            Self::OpenStack => to_raw(
                "OpenStack control plane config",
                &openstack::control_plane_config(),
            ),
        }
    }
}

/// Encodes a provider config as an embedded raw object.
///
/// # Errors
///
/// Returns [`ConversionError::Encoding`] if serialization fails.
pub fn to_raw<T: Serialize>(what: &'static str, config: &T) -> Result<Value, ConversionError> {
    serde_json::to_value(config).map_err(|source| ConversionError::Encoding { what, source })
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
