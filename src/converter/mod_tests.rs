// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::constants::{EXTENSION_CERT, EXTENSION_DNS, EXTENSION_NETWORK_FILTER, EXTENSION_OIDC};
    use crate::gardener::{FailureTolerance, HighAvailability};
    use crate::test_support::{aws_runtime, converter_config, runtime, SHOOT_NAME};

    #[test]
    fn test_extender_order() {
        let names: Vec<_> = EXTENDERS.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            [
                "annotations",
                "labels",
                "kubernetes",
                "provider",
                "dns",
                "oidc",
                "cloudProfile",
                "networkFilter",
                "certConfig",
                "exposureClassName",
                "tolerations",
                "maintenance",
            ]
        );
    }

    #[test]
    fn test_to_shoot_aws_end_to_end() {
        let converter = Converter::new(converter_config());
        let shoot = converter.to_shoot(&aws_runtime()).unwrap();

        assert_eq!(shoot.metadata.name.as_deref(), Some(SHOOT_NAME));
        assert_eq!(shoot.metadata.namespace.as_deref(), Some("garden-kyma-dev"));
        assert_eq!(shoot.spec.purpose.as_deref(), Some("production"));
        assert_eq!(shoot.spec.region, "eu-central-1");
        assert_eq!(
            shoot.spec.secret_binding_name.as_deref(),
            Some("hyperscaler-credentials")
        );
        assert_eq!(shoot.spec.cloud_profile_name.as_deref(), Some("aws"));

        let networking = shoot.spec.networking.as_ref().unwrap();
        assert_eq!(networking.r#type.as_deref(), Some("calico"));
        assert_eq!(networking.nodes.as_deref(), Some("10.250.0.0/16"));
        assert_eq!(networking.pods.as_deref(), Some("100.64.0.0/12"));
        assert_eq!(networking.services.as_deref(), Some("100.104.0.0/13"));

        let types: Vec<_> = shoot
            .spec
            .extensions
            .as_ref()
            .unwrap()
            .iter()
            .map(|e| e.r#type.as_str())
            .collect();
        assert_eq!(
            types,
            [EXTENSION_DNS, EXTENSION_OIDC, EXTENSION_NETWORK_FILTER, EXTENSION_CERT]
        );
        assert!(shoot.status.is_none());
    }

    #[test]
    fn test_to_shoot_keeps_control_plane_ha_and_network_type() {
        let mut runtime = runtime("azure", &["1", "2", "3"]);
        runtime.spec.shoot.networking.r#type = Some("cilium".into());
        runtime.spec.shoot.control_plane = Some(crate::gardener::ControlPlane {
            high_availability: Some(HighAvailability {
                failure_tolerance: FailureTolerance {
                    r#type: "zone".into(),
                },
            }),
        });

        let shoot = Converter::new(converter_config()).to_shoot(&runtime).unwrap();
        assert_eq!(
            shoot.spec.networking.unwrap().r#type.as_deref(),
            Some("cilium")
        );
        assert_eq!(
            shoot
                .spec
                .control_plane
                .and_then(|cp| cp.high_availability)
                .map(|ha| ha.failure_tolerance.r#type),
            Some("zone".to_string())
        );
        assert_eq!(
            shoot.spec.provider.infrastructure_config.unwrap()["zoned"],
            true
        );
    }

    #[test]
    fn test_to_shoot_is_deterministic() {
        let converter = Converter::new(converter_config());
        let runtime = aws_runtime();

        let first = serde_json::to_vec(&converter.to_shoot(&runtime).unwrap()).unwrap();
        let second = serde_json::to_vec(&converter.to_shoot(&runtime).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_to_shoot_fails_on_unsupported_provider() {
        let converter = Converter::new(converter_config());
        let err = converter.to_shoot(&runtime("alicloud", &["a"])).unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedProvider(_)));
    }

    #[test]
    fn test_every_provider_converts() {
        let converter = Converter::new(converter_config());
        for (provider, zones) in [
            ("aws", vec!["eu-central-1a"]),
            ("azure", vec!["1"]),
            ("gcp", vec!["europe-west3-a"]),
            ("openstack", vec!["eu-de-1a"]),
        ] {
            let shoot = converter.to_shoot(&runtime(provider, &zones)).unwrap();
            assert_eq!(shoot.spec.provider.r#type, provider);
            assert!(shoot.spec.provider.control_plane_config.is_some());
        }
    }
}
