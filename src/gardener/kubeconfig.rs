// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Admin kubeconfig retrieval through the Gardener `adminkubeconfig` subresource.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use kube::api::PostParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use tracing::debug;

use super::{AdminKubeconfigRequest, Shoot};
use crate::constants::ADMIN_KUBECONFIG_SUBRESOURCE;
use crate::errors::KubeconfigError;

/// Source of short-lived admin kubeconfigs for shoots.
#[async_trait]
pub trait KubeconfigProvider: Send + Sync {
    /// Returns kubeconfig bytes for `shoot_name` valid for `expiration_seconds`.
    async fn fetch(
        &self,
        shoot_name: &str,
        expiration_seconds: i64,
    ) -> Result<Vec<u8>, KubeconfigError>;
}

/// [`KubeconfigProvider`] backed by the Gardener project namespace.
#[derive(Clone)]
pub struct GardenerKubeconfigProvider {
    shoots: Api<Shoot>,
}

impl GardenerKubeconfigProvider {
    #[must_use]
    pub fn new(gardener_client: Client, project_namespace: &str) -> Self {
        Self {
            shoots: Api::namespaced(gardener_client, project_namespace),
        }
    }
}

#[async_trait]
impl KubeconfigProvider for GardenerKubeconfigProvider {
    async fn fetch(
        &self,
        shoot_name: &str,
        expiration_seconds: i64,
    ) -> Result<Vec<u8>, KubeconfigError> {
        debug!(shoot = %shoot_name, expiration_seconds, "Requesting admin kubeconfig");

        let request = AdminKubeconfigRequest::new(expiration_seconds);
        let response: AdminKubeconfigRequest = self
            .shoots
            .create_subresource(
                ADMIN_KUBECONFIG_SUBRESOURCE,
                shoot_name,
                &PostParams::default(),
                &request,
            )
            .await
            .map_err(|e| match e {
                kube::Error::Api(ref response) if response.code == 404 => {
                    KubeconfigError::ShootNotFound {
                        shoot: shoot_name.to_string(),
                    }
                }
                other => KubeconfigError::Api(other),
            })?;

        decode_kubeconfig(shoot_name, &response)
    }
}

/// Extracts the kubeconfig bytes from a subresource response.
///
/// # Errors
///
/// Returns [`KubeconfigError::EmptyKubeconfig`] when the response carries no
/// kubeconfig and [`KubeconfigError::Decode`] when it is not valid base64.
pub fn decode_kubeconfig(
    shoot_name: &str,
    response: &AdminKubeconfigRequest,
) -> Result<Vec<u8>, KubeconfigError> {
    let encoded = response
        .status
        .as_ref()
        .map(|s| s.kubeconfig.as_str())
        .unwrap_or_default();

    if encoded.is_empty() {
        return Err(KubeconfigError::EmptyKubeconfig {
            shoot: shoot_name.to_string(),
        });
    }

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|source| KubeconfigError::Decode {
            shoot: shoot_name.to_string(),
            source,
        })?;

    if bytes.is_empty() {
        return Err(KubeconfigError::EmptyKubeconfig {
            shoot: shoot_name.to_string(),
        });
    }
    Ok(bytes)
}

/// Builds a client for the cluster described by `kubeconfig`.
///
/// # Errors
///
/// Returns an error if the kubeconfig is malformed or the client cannot be built.
pub async fn client_from_kubeconfig(kubeconfig: &[u8]) -> Result<Client, KubeconfigError> {
    let raw = String::from_utf8_lossy(kubeconfig);
    let parsed = Kubeconfig::from_yaml(&raw)?;
    let config = Config::from_custom_kubeconfig(parsed, &KubeConfigOptions::default()).await?;
    Ok(Client::try_from(config)?)
}

/// Builds a client from a kubeconfig file on disk, e.g. the Gardener project kubeconfig.
///
/// # Errors
///
/// Returns an error if the file is unreadable or the kubeconfig is invalid.
pub async fn client_from_kubeconfig_file(
    path: &std::path::Path,
) -> Result<Client, KubeconfigError> {
    let parsed = Kubeconfig::read_from(path)?;
    let config = Config::from_custom_kubeconfig(parsed, &KubeConfigOptions::default()).await?;
    Ok(Client::try_from(config)?)
}

#[cfg(test)]
#[path = "kubeconfig_tests.rs"]
mod kubeconfig_tests;
