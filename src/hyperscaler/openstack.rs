// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! OpenStack (SAP Converged Cloud) provider configuration.

use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = "openstack.provider.extensions.gardener.cloud/v1alpha1";

const FLOATING_POOL_NAME: &str = "FloatingIP-external-kyma-01";
const LOAD_BALANCER_PROVIDER: &str = "f5";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureConfig {
    pub api_version: String,
    pub kind: String,
    pub floating_pool_name: String,
    pub networks: Networks,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Networks {
    pub workers: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneConfig {
    pub api_version: String,
    pub kind: String,
    pub load_balancer_provider: String,
}

#[must_use]
pub fn infrastructure_config(workers_cidr: &str) -> InfrastructureConfig {
    InfrastructureConfig {
        api_version: API_VERSION.to_string(),
        kind: "InfrastructureConfig".to_string(),
        floating_pool_name: FLOATING_POOL_NAME.to_string(),
        networks: Networks {
            workers: workers_cidr.to_string(),
        },
    }
}

#[must_use]
pub fn control_plane_config() -> ControlPlaneConfig {
    ControlPlaneConfig {
        api_version: API_VERSION.to_string(),
        kind: "ControlPlaneConfig".to_string(),
        load_balancer_provider: LOAD_BALANCER_PROVIDER.to_string(),
    }
}

#[cfg(test)]
#[path = "openstack_tests.rs"]
mod openstack_tests;
