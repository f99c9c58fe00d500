// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared fixtures for unit tests.

use std::collections::BTreeMap;

use crate::config::{
    AuditLogConfig, AwsConfig, ConverterConfig, DnsConfig, GardenerConfig, KubernetesConfig,
    MachineImageConfig, OidcProviderConfig, ProviderConfig,
};
use crate::crd::{
    Filter, FilterSwitch, NetworkingSecurity, Runtime, RuntimeApiServer, RuntimeKubernetes,
    RuntimeNetworking, RuntimeProvider, RuntimeShoot, RuntimeSpec, Security,
};
use crate::gardener::{Machine, OidcConfig, Worker};
use crate::labels::{LABEL_GLOBAL_ACCOUNT_ID, LABEL_RUNTIME_ID, LABEL_SUBACCOUNT_ID};

pub(crate) const RUNTIME_ID: &str = "runtime-1";
pub(crate) const SHOOT_NAME: &str = "c-12345";

pub(crate) fn converter_config() -> ConverterConfig {
    ConverterConfig {
        kubernetes: KubernetesConfig {
            default_version: "1.30".to_string(),
            enable_kubernetes_version_auto_update: true,
            enable_machine_image_version_auto_update: false,
            default_operator_oidc: OidcProviderConfig {
                client_id: "operator-client".to_string(),
                groups_claim: "groups".to_string(),
                groups_prefix: String::new(),
                issuer_url: "https://operator.example.com".to_string(),
                signing_algs: vec!["RS256".to_string()],
                username_claim: "sub".to_string(),
                username_prefix: "-".to_string(),
            },
        },
        dns: DnsConfig {
            secret_name: "dns-secret".to_string(),
            domain_prefix: "dev.kyma.example".to_string(),
            provider_type: "aws-route53".to_string(),
        },
        provider: ProviderConfig {
            aws: AwsConfig {
                enable_imdsv2: true,
            },
        },
        machine_image: MachineImageConfig {
            default_name: "gardenlinux".to_string(),
            default_version: "1592.1.0".to_string(),
        },
        gardener: GardenerConfig {
            project_name: "kyma-dev".to_string(),
        },
        audit_logging: AuditLogConfig {
            policy_config_map_name: "audit-policy".to_string(),
            tenant_config_path: String::new(),
        },
        default_shared_ias_tenant: None,
    }
}

pub(crate) fn runtime(provider: &str, zones: &[&str]) -> Runtime {
    let mut labels = BTreeMap::new();
    labels.insert(LABEL_RUNTIME_ID.to_string(), RUNTIME_ID.to_string());
    labels.insert(LABEL_GLOBAL_ACCOUNT_ID.to_string(), "ga-1".to_string());
    labels.insert(LABEL_SUBACCOUNT_ID.to_string(), "sa-1".to_string());

    let mut runtime = Runtime::new(
        RUNTIME_ID,
        RuntimeSpec {
            shoot: RuntimeShoot {
                name: SHOOT_NAME.to_string(),
                purpose: "production".to_string(),
                platform_region: "cf-eu10".to_string(),
                region: "eu-central-1".to_string(),
                licence_type: None,
                secret_binding_name: "hyperscaler-credentials".to_string(),
                kubernetes: RuntimeKubernetes {
                    version: None,
                    kube_api_server: RuntimeApiServer {
                        oidc_config: OidcConfig::default(),
                        additional_oidc_config: None,
                    },
                },
                provider: RuntimeProvider {
                    r#type: provider.to_string(),
                    workers: vec![Worker {
                        name: "cpu-worker-0".to_string(),
                        machine: Machine {
                            r#type: "m6i.large".to_string(),
                            image: None,
                        },
                        minimum: 3,
                        maximum: 20,
                        zones: zones.iter().map(ToString::to_string).collect(),
                        ..Worker::default()
                    }],
                },
                networking: RuntimeNetworking {
                    r#type: None,
                    nodes: "10.250.0.0/16".to_string(),
                    pods: "100.64.0.0/12".to_string(),
                    services: "100.104.0.0/13".to_string(),
                },
                control_plane: None,
            },
            security: Security {
                administrators: vec!["admin@example.com".to_string()],
                networking: NetworkingSecurity {
                    filter: Filter {
                        egress: FilterSwitch { enabled: false },
                        ingress: None,
                    },
                },
            },
        },
    );
    runtime.metadata.namespace = Some("kcp-system".to_string());
    runtime.metadata.labels = Some(labels);
    runtime.metadata.generation = Some(1);
    runtime.metadata.uid = Some("5e0b3c2a-0000-4000-8000-000000000001".to_string());
    runtime
}

pub(crate) fn aws_runtime() -> Runtime {
    runtime("aws", &["eu-central-1a", "eu-central-1b", "eu-central-1c"])
}
