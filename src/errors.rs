// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Domain error types.
//!
//! Pure building blocks (converter, emitters, comparator, kubeconfig fetch,
//! audit log) return these typed errors so callers can tell terminal failures
//! from transient ones. Reconcilers wrap them in `anyhow::Error` with context.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a `Runtime` into a `Shoot`. Always terminal for the object.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("unsupported provider type '{0}'")]
    UnsupportedProvider(String),

    #[error("provider '{provider}' requires at least one zone")]
    EmptyZones { provider: String },

    #[error("networking.nodes CIDR is required")]
    MissingNodesCidr,

    #[error("invalid CIDR '{cidr}': {reason}")]
    InvalidCidr { cidr: String, reason: String },

    #[error("{zones} zones do not fit into worker CIDR {cidr}")]
    ZonesExceedCidr { cidr: String, zones: usize },

    #[error("failed to encode {what}: {source}")]
    Encoding {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to obtain or use an admin kubeconfig from Gardener.
#[derive(Debug, Error)]
pub enum KubeconfigError {
    #[error("shoot '{shoot}' not found in Gardener")]
    ShootNotFound { shoot: String },

    #[error("Gardener returned an empty kubeconfig for shoot '{shoot}'")]
    EmptyKubeconfig { shoot: String },

    #[error("failed to decode kubeconfig of shoot '{shoot}': {source}")]
    Decode {
        shoot: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("invalid kubeconfig: {0}")]
    Invalid(#[from] kube::config::KubeconfigError),

    #[error("Gardener API error: {0}")]
    Api(#[from] kube::Error),
}

impl KubeconfigError {
    /// Returns `true` when the shoot no longer exists and retrying is pointless.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::ShootNotFound { .. } => true,
            Self::Api(kube::Error::Api(response)) => response.code == 404,
            _ => false,
        }
    }
}

/// Failure to configure the audit log extension of a shoot.
#[derive(Debug, Error)]
pub enum AuditLogError {
    #[error("no audit log tenant configured for provider '{provider_type}' in region '{region}'")]
    MissingMapping {
        provider_type: String,
        region: String,
    },

    #[error("failed to read audit log tenant config {}: {source}", path.display())]
    TenantConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse audit log tenant config {}: {source}", path.display())]
    TenantConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("seed '{0}' has no provider type")]
    SeedWithoutProvider(String),

    #[error("failed to encode audit log config: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),
}

/// Failure of the shoot comparator tooling.
#[derive(Debug, Error)]
pub enum ComparatorError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse shoot from {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to render report: {0}")]
    Render(#[from] serde_yaml::Error),

    #[error("failed to serialize shoot: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
