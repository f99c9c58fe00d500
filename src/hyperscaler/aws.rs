// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! AWS provider configuration.
//!
//! The worker CIDR is split into one `(workers, public, internal)` triple per
//! zone. With worker prefix `P + 3` every zone takes a quarter of the CIDR:
//!
//! ```text
//! 10.250.0.0/16 -> 10.250.0.0/19   10.250.32.0/20  10.250.48.0/20
//!                  10.250.64.0/19  10.250.96.0/20  10.250.112.0/20
//!                  ...
//! ```

use serde::{Deserialize, Serialize};

use super::cidr::Ipv4Cidr;
use crate::errors::ConversionError;

pub const API_VERSION: &str = "aws.provider.extensions.gardener.cloud/v1alpha1";

const HTTP_TOKENS_REQUIRED: &str = "required";
const HTTP_PUT_RESPONSE_HOP_LIMIT: i64 = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureConfig {
    pub api_version: String,
    pub kind: String,
    pub networks: Networks,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Networks {
    pub vpc: Vpc,
    pub zones: Vec<Zone>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vpc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub workers: String,
    pub public: String,
    pub internal: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneConfig {
    pub api_version: String,
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerConfig {
    pub api_version: String,
    pub kind: String,
    pub instance_metadata_options: InstanceMetadataOptions,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceMetadataOptions {
    pub http_tokens: String,
    pub http_put_response_hop_limit: i64,
}

/// Subnets assigned to one availability zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneSubnets {
    pub workers: Ipv4Cidr,
    pub public: Ipv4Cidr,
    pub internal: Ipv4Cidr,
}

/// Splits `workers_cidr` into one subnet triple per zone, in input order.
///
/// Each zone takes a quarter of the CIDR (a worker subnet of `prefix + 3`
/// followed by public and internal subnets of `prefix + 4`), so at most four
/// zones fit whatever the prefix length.
///
/// # Errors
///
/// Returns [`ConversionError::InvalidCidr`] if the CIDR is too small to
/// subdivide, and [`ConversionError::ZonesExceedCidr`] for more than four zones.
pub fn zone_subnets(
    workers_cidr: &str,
    zone_count: usize,
) -> Result<Vec<ZoneSubnets>, ConversionError> {
    let cidr: Ipv4Cidr = workers_cidr.parse()?;
    let worker_prefix = cidr.prefix() + 3;
    if worker_prefix + 1 > 32 {
        return Err(ConversionError::InvalidCidr {
            cidr: workers_cidr.to_string(),
            reason: "prefix too long to split into zone subnets".to_string(),
        });
    }

    let delta: u64 = 1 << (31 - u32::from(worker_prefix));
    let per_zone = 4 * delta;
    let zones = u64::try_from(zone_count).unwrap_or(u64::MAX);
    if zones.saturating_mul(per_zone) > cidr.size() {
        return Err(ConversionError::ZonesExceedCidr {
            cidr: workers_cidr.to_string(),
            zones: zone_count,
        });
    }

    let mut base = u64::from(cidr.network());
    let mut subnets = Vec::with_capacity(zone_count);
    for _ in 0..zone_count {
        let workers = Ipv4Cidr::new(to_u32(base)?, worker_prefix)?;
        base += 2 * delta;
        let public = Ipv4Cidr::new(to_u32(base)?, worker_prefix + 1)?;
        base += delta;
        let internal = Ipv4Cidr::new(to_u32(base)?, worker_prefix + 1)?;
        base += delta;

        subnets.push(ZoneSubnets {
            workers,
            public,
            internal,
        });
    }
    Ok(subnets)
}

fn to_u32(address: u64) -> Result<u32, ConversionError> {
    u32::try_from(address).map_err(|_| ConversionError::InvalidCidr {
        cidr: address.to_string(),
        reason: "address overflows IPv4 space".to_string(),
    })
}

/// # Errors
///
/// Propagates subdivision failures from [`zone_subnets`].
pub fn infrastructure_config(
    workers_cidr: &str,
    zones: &[String],
) -> Result<InfrastructureConfig, ConversionError> {
    let subnets = zone_subnets(workers_cidr, zones.len())?;

    Ok(InfrastructureConfig {
        api_version: API_VERSION.to_string(),
        kind: "InfrastructureConfig".to_string(),
        networks: Networks {
            vpc: Vpc {
                cidr: Some(workers_cidr.to_string()),
            },
            zones: zones
                .iter()
                .zip(subnets)
                .map(|(name, subnet)| Zone {
                    name: name.clone(),
                    workers: subnet.workers.to_string(),
                    public: subnet.public.to_string(),
                    internal: subnet.internal.to_string(),
                })
                .collect(),
        },
    })
}

#[must_use]
pub fn control_plane_config() -> ControlPlaneConfig {
    ControlPlaneConfig {
        api_version: API_VERSION.to_string(),
        kind: "ControlPlaneConfig".to_string(),
    }
}

/// Worker configuration enforcing IMDSv2.
#[must_use]
pub fn worker_config() -> WorkerConfig {
    WorkerConfig {
        api_version: API_VERSION.to_string(),
        kind: "WorkerConfig".to_string(),
        instance_metadata_options: InstanceMetadataOptions {
            http_tokens: HTTP_TOKENS_REQUIRED.to_string(),
            http_put_response_hop_limit: HTTP_PUT_RESPONSE_HOP_LIMIT,
        },
    }
}

#[cfg(test)]
#[path = "aws_tests.rs"]
mod aws_tests;
