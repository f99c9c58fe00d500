// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Azure provider configuration.
//!
//! A cluster is zoned when at least one worker zone is an Azure zone number
//! (`1`, `2` or `3`). Each valid zone gets an eighth of the worker CIDR and a NAT
//! gateway. Any other zone name is dropped.

use serde::{Deserialize, Serialize};

use super::cidr::Ipv4Cidr;
use crate::errors::ConversionError;

pub const API_VERSION: &str = "azure.provider.extensions.gardener.cloud/v1alpha1";

const NAT_GATEWAY_IDLE_TIMEOUT_MINUTES: i32 = 4;
const MAX_ZONE_NUMBER: i32 = 3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureConfig {
    pub api_version: String,
    pub kind: String,
    pub networks: Networks,
    pub zoned: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Networks {
    pub vnet: Vnet,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<Zone>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vnet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub name: i32,
    pub cidr: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nat_gateway: Option<NatGateway>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NatGateway {
    pub enabled: bool,
    pub idle_connection_timeout_minutes: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneConfig {
    pub api_version: String,
    pub kind: String,
}

/// Parses Azure zone numbers, dropping anything outside `1..=3`.
#[must_use]
pub fn zone_numbers(zones: &[String]) -> Vec<i32> {
    zones
        .iter()
        .filter_map(|zone| zone.trim().parse::<i32>().ok())
        .filter(|zone| (1..=MAX_ZONE_NUMBER).contains(zone))
        .collect()
}

/// Splits `workers_cidr` into one `/P+3` CIDR per zone, in input order.
///
/// # Errors
///
/// Fails if the CIDR is too small to subdivide or the zones do not fit.
pub fn zone_cidrs(workers_cidr: &str, zone_count: usize) -> Result<Vec<Ipv4Cidr>, ConversionError> {
    let cidr: Ipv4Cidr = workers_cidr.parse()?;
    let worker_prefix = cidr.prefix() + 3;
    if worker_prefix > 32 {
        return Err(ConversionError::InvalidCidr {
            cidr: workers_cidr.to_string(),
            reason: "prefix too long to split into zone subnets".to_string(),
        });
    }

    let delta: u64 = 1 << (32 - u32::from(worker_prefix));
    let zones = u64::try_from(zone_count).unwrap_or(u64::MAX);
    if zones.saturating_mul(delta) > cidr.size() {
        return Err(ConversionError::ZonesExceedCidr {
            cidr: workers_cidr.to_string(),
            zones: zone_count,
        });
    }

    let mut base = u64::from(cidr.network());
    let mut cidrs = Vec::with_capacity(zone_count);
    for _ in 0..zone_count {
        let address = u32::try_from(base).map_err(|_| ConversionError::InvalidCidr {
            cidr: workers_cidr.to_string(),
            reason: "address overflows IPv4 space".to_string(),
        })?;
        cidrs.push(Ipv4Cidr::new(address, worker_prefix)?);
        base += delta;
    }
    Ok(cidrs)
}

/// # Errors
///
/// Propagates subdivision failures from [`zone_cidrs`].
pub fn infrastructure_config(
    workers_cidr: &str,
    zones: &[String],
) -> Result<InfrastructureConfig, ConversionError> {
    let numbers = zone_numbers(zones);

    if numbers.is_empty() {
        return Ok(InfrastructureConfig {
            api_version: API_VERSION.to_string(),
            kind: "InfrastructureConfig".to_string(),
            networks: Networks {
                vnet: Vnet {
                    cidr: Some(workers_cidr.to_string()),
                },
                workers: Some(workers_cidr.to_string()),
                zones: Vec::new(),
            },
            zoned: false,
        });
    }

    let cidrs = zone_cidrs(workers_cidr, numbers.len())?;
    Ok(InfrastructureConfig {
        api_version: API_VERSION.to_string(),
        kind: "InfrastructureConfig".to_string(),
        networks: Networks {
            vnet: Vnet {
                cidr: Some(workers_cidr.to_string()),
            },
            workers: None,
            zones: numbers
                .into_iter()
                .zip(cidrs)
                .map(|(name, cidr)| Zone {
                    name,
                    cidr: cidr.to_string(),
                    nat_gateway: Some(NatGateway {
                        enabled: true,
                        idle_connection_timeout_minutes: NAT_GATEWAY_IDLE_TIMEOUT_MINUTES,
                    }),
                })
                .collect(),
        },
        zoned: true,
    })
}

#[must_use]
pub fn control_plane_config() -> ControlPlaneConfig {
    ControlPlaneConfig {
        api_version: API_VERSION.to_string(),
        kind: "ControlPlaneConfig".to_string(),
    }
}

#[cfg(test)]
#[path = "azure_tests.rs"]
mod azure_tests;
