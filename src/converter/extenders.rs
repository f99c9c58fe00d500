// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shoot extenders.
//!
//! Every function here is pure: it reads the Runtime and the configuration and
//! writes only the shoot fields it owns.

use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::ConverterConfig;
use crate::constants::{
    EU_ACCESS_PLATFORM_REGIONS, EXTENSION_CERT, EXTENSION_DNS, EXTENSION_NETWORK_FILTER,
    EXTENSION_OIDC, KSA_REGION, KSA_TOLERATION_KEY, OPENSTACK_EXPOSURE_CLASS_NAME,
};
use crate::crd::Runtime;
use crate::errors::ConversionError;
use crate::gardener::{
    Dns, DnsIncludeExclude, DnsProvider, Extension, KubeApiServerConfig, Maintenance,
    MaintenanceAutoUpdate, OidcConfig, Shoot, ShootMachineImage, Toleration,
};
use crate::hyperscaler::{self, Provider};
use crate::labels::{
    ANNOTATION_EU_ACCESS, ANNOTATION_LICENCE_TYPE, ANNOTATION_RUNTIME_GENERATION,
    ANNOTATION_RUNTIME_ID, LABEL_GLOBAL_ACCOUNT_ID, LABEL_RUNTIME_ID, LABEL_SUBACCOUNT_ID,
    SHOOT_LABEL_ACCOUNT, SHOOT_LABEL_SUBACCOUNT,
};

const DNS_CONFIG_API_VERSION: &str = "service.dns.extensions.gardener.cloud/v1alpha1";
const CERT_CONFIG_API_VERSION: &str = "service.cert.extensions.gardener.cloud/v1alpha1";

/// Appends an extension, replacing an existing one of the same type.
pub fn upsert_extension(shoot: &mut Shoot, extension: Extension) {
    let extensions = shoot.spec.extensions.get_or_insert_with(Vec::new);
    match extensions.iter_mut().find(|e| e.r#type == extension.r#type) {
        Some(existing) => *existing = extension,
        None => extensions.push(extension),
    }
}

fn label_or_empty(runtime: &Runtime, key: &str) -> String {
    runtime.label(key).unwrap_or_default().to_string()
}

/// Runtime id, generation, licence type and EU access annotations.
pub fn extend_annotations(
    runtime: &Runtime,
    shoot: &mut Shoot,
    _config: &ConverterConfig,
) -> Result<(), ConversionError> {
    let annotations = shoot.metadata.annotations.get_or_insert_with(BTreeMap::new);

    annotations.insert(
        ANNOTATION_RUNTIME_ID.to_string(),
        label_or_empty(runtime, LABEL_RUNTIME_ID),
    );
    annotations.insert(
        ANNOTATION_RUNTIME_GENERATION.to_string(),
        runtime.metadata.generation.unwrap_or_default().to_string(),
    );

    if let Some(licence) = runtime
        .spec
        .shoot
        .licence_type
        .as_deref()
        .filter(|l| !l.is_empty())
    {
        annotations.insert(ANNOTATION_LICENCE_TYPE.to_string(), licence.to_string());
    }

    if EU_ACCESS_PLATFORM_REGIONS.contains(&runtime.spec.shoot.platform_region.as_str()) {
        annotations.insert(ANNOTATION_EU_ACCESS.to_string(), "true".to_string());
    }

    Ok(())
}

/// Exactly the `account` and `subaccount` labels.
pub fn extend_labels(
    runtime: &Runtime,
    shoot: &mut Shoot,
    _config: &ConverterConfig,
) -> Result<(), ConversionError> {
    let mut labels = BTreeMap::new();
    labels.insert(
        SHOOT_LABEL_ACCOUNT.to_string(),
        label_or_empty(runtime, LABEL_GLOBAL_ACCOUNT_ID),
    );
    labels.insert(
        SHOOT_LABEL_SUBACCOUNT.to_string(),
        label_or_empty(runtime, LABEL_SUBACCOUNT_ID),
    );
    shoot.metadata.labels = Some(labels);
    Ok(())
}

pub fn extend_kubernetes(
    runtime: &Runtime,
    shoot: &mut Shoot,
    config: &ConverterConfig,
) -> Result<(), ConversionError> {
    let version = runtime
        .spec
        .shoot
        .kubernetes
        .version
        .clone()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| config.kubernetes.default_version.clone());

    shoot.spec.kubernetes.version = Some(version);
    shoot.spec.kubernetes.enable_static_token_kubeconfig = Some(false);
    Ok(())
}

/// Provider type, workers and the hyperscaler configuration blobs.
pub fn extend_provider(
    runtime: &Runtime,
    shoot: &mut Shoot,
    config: &ConverterConfig,
) -> Result<(), ConversionError> {
    let runtime_provider = &runtime.spec.shoot.provider;
    let provider: Provider = runtime_provider.r#type.parse()?;

    let nodes = runtime.spec.shoot.networking.nodes.as_str();
    if nodes.is_empty() {
        return Err(ConversionError::MissingNodesCidr);
    }

    let zones: Vec<String> = runtime_provider
        .workers
        .iter()
        .flat_map(|w| w.zones.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut workers = runtime_provider.workers.clone();
    for worker in &mut workers {
        let image = worker.machine.image.get_or_insert_with(|| ShootMachineImage {
            name: String::new(),
            version: None,
        });
        if image.name.is_empty() {
            image.name.clone_from(&config.machine_image.default_name);
        }
        if image.version.as_deref().unwrap_or_default().is_empty() {
            image.version = Some(config.machine_image.default_version.clone());
        }
    }

    if provider == Provider::Aws && config.provider.aws.enable_imdsv2 {
        if let Some(first) = workers.first_mut() {
            first.provider_config = Some(hyperscaler::to_raw(
                "AWS worker config",
                &hyperscaler::aws::worker_config(),
            )?);
        }
    }

    shoot.spec.provider.r#type = provider.as_str().to_string();
    shoot.spec.provider.infrastructure_config =
        Some(provider.infrastructure_config(nodes, &zones)?);
    shoot.spec.provider.control_plane_config = Some(provider.control_plane_config(&zones)?);
    shoot.spec.provider.workers = workers;
    Ok(())
}

/// Shoot domain, primary DNS provider and the DNS service extension.
pub fn extend_dns(
    _runtime: &Runtime,
    shoot: &mut Shoot,
    config: &ConverterConfig,
) -> Result<(), ConversionError> {
    let shoot_name = shoot.metadata.name.clone().unwrap_or_default();
    let domain = format!("{shoot_name}.{}", config.dns.domain_prefix);

    shoot.spec.dns = Some(Dns {
        domain: Some(domain.clone()),
        providers: Some(vec![DnsProvider {
            domains: Some(DnsIncludeExclude {
                include: vec![domain],
                exclude: Vec::new(),
            }),
            primary: Some(true),
            secret_name: Some(config.dns.secret_name.clone()),
            r#type: Some(config.dns.provider_type.clone()),
        }]),
    });

    upsert_extension(
        shoot,
        Extension {
            r#type: EXTENSION_DNS.to_string(),
            provider_config: Some(json!({
                "apiVersion": DNS_CONFIG_API_VERSION,
                "kind": "DNSConfig",
                "dnsProviderReplication": { "enabled": true },
                "syncProvidersFromShootSpecDNS": true,
            })),
            disabled: None,
        },
    );
    Ok(())
}

/// OIDC service extension and the API server OIDC config.
pub fn extend_oidc(
    runtime: &Runtime,
    shoot: &mut Shoot,
    config: &ConverterConfig,
) -> Result<(), ConversionError> {
    if !runtime.is_created_by_migrator() {
        upsert_extension(
            shoot,
            Extension {
                r#type: EXTENSION_OIDC.to_string(),
                provider_config: None,
                disabled: Some(false),
            },
        );
    }

    let oidc = effective_oidc_config(
        &runtime.spec.shoot.kubernetes.kube_api_server.oidc_config,
        config,
    );
    shoot
        .spec
        .kubernetes
        .kube_api_server
        .get_or_insert_with(KubeApiServerConfig::default)
        .oidc_config = Some(oidc);
    Ok(())
}

/// Runtime OIDC config, or the configured default when neither client ID nor issuer is set.
#[must_use]
pub fn effective_oidc_config(oidc: &OidcConfig, config: &ConverterConfig) -> OidcConfig {
    let unset = |value: &Option<String>| value.as_deref().unwrap_or_default().is_empty();
    if unset(&oidc.client_id) && unset(&oidc.issuer_url) {
        config.default_oidc().to_oidc_config()
    } else {
        oidc.clone()
    }
}

pub fn extend_cloud_profile(
    runtime: &Runtime,
    shoot: &mut Shoot,
    _config: &ConverterConfig,
) -> Result<(), ConversionError> {
    let provider: Provider = runtime.spec.shoot.provider.r#type.parse()?;
    shoot.spec.cloud_profile_name = Some(provider.cloud_profile_name().to_string());
    Ok(())
}

pub fn extend_network_filter(
    runtime: &Runtime,
    shoot: &mut Shoot,
    _config: &ConverterConfig,
) -> Result<(), ConversionError> {
    let egress_enabled = runtime.spec.security.networking.filter.egress.enabled;
    upsert_extension(
        shoot,
        Extension {
            r#type: EXTENSION_NETWORK_FILTER.to_string(),
            provider_config: None,
            disabled: Some(!egress_enabled),
        },
    );
    Ok(())
}

pub fn extend_cert_config(
    _runtime: &Runtime,
    shoot: &mut Shoot,
    _config: &ConverterConfig,
) -> Result<(), ConversionError> {
    upsert_extension(
        shoot,
        Extension {
            r#type: EXTENSION_CERT.to_string(),
            provider_config: Some(json!({
                "apiVersion": CERT_CONFIG_API_VERSION,
                "kind": "CertConfig",
                "shootIssuers": { "enabled": true },
            })),
            disabled: None,
        },
    );
    Ok(())
}

pub fn extend_exposure_class_name(
    runtime: &Runtime,
    shoot: &mut Shoot,
    _config: &ConverterConfig,
) -> Result<(), ConversionError> {
    if runtime.spec.shoot.provider.r#type == Provider::OpenStack.as_str() {
        shoot.spec.exposure_class_name = Some(OPENSTACK_EXPOSURE_CLASS_NAME.to_string());
    }
    Ok(())
}

pub fn extend_tolerations(
    runtime: &Runtime,
    shoot: &mut Shoot,
    _config: &ConverterConfig,
) -> Result<(), ConversionError> {
    if runtime.spec.shoot.region == KSA_REGION {
        shoot
            .spec
            .tolerations
            .get_or_insert_with(Vec::new)
            .push(Toleration {
                key: KSA_TOLERATION_KEY.to_string(),
                value: None,
            });
    }
    Ok(())
}

pub fn extend_maintenance(
    _runtime: &Runtime,
    shoot: &mut Shoot,
    config: &ConverterConfig,
) -> Result<(), ConversionError> {
    shoot.spec.maintenance = Some(Maintenance {
        auto_update: Some(MaintenanceAutoUpdate {
            kubernetes_version: config.kubernetes.enable_kubernetes_version_auto_update,
            machine_image_version: Some(
                config.kubernetes.enable_machine_image_version_auto_update,
            ),
        }),
        time_window: None,
    });
    Ok(())
}

#[cfg(test)]
#[path = "extenders_tests.rs"]
mod extenders_tests;
