// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use super::super::*;

    fn zones(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("aws".parse::<Provider>().unwrap(), Provider::Aws);
        assert_eq!("azure".parse::<Provider>().unwrap(), Provider::Azure);
        assert_eq!("gcp".parse::<Provider>().unwrap(), Provider::Gcp);
        assert_eq!("openstack".parse::<Provider>().unwrap(), Provider::OpenStack);

        let err = "alicloud".parse::<Provider>().unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedProvider(p) if p == "alicloud"));
        assert!("AWS".parse::<Provider>().is_err());
    }

    #[test]
    fn test_cloud_profile_names() {
        assert_eq!(Provider::Aws.cloud_profile_name(), "aws");
        assert_eq!(Provider::Azure.cloud_profile_name(), "az");
        assert_eq!(Provider::Gcp.cloud_profile_name(), "gcp");
        assert_eq!(Provider::OpenStack.cloud_profile_name(), "converged-cloud-kyma");
    }

    #[test]
    fn test_every_provider_tags_its_blobs() {
        let zones = zones(&["1", "2"]);
        for provider in [Provider::Aws, Provider::Azure, Provider::Gcp, Provider::OpenStack] {
            let infra = provider.infrastructure_config("10.250.0.0/16", &zones).unwrap();
            let control_plane = provider.control_plane_config(&zones).unwrap();

            let api_version = format!("{provider}.provider.extensions.gardener.cloud/v1alpha1");
            assert_eq!(infra["apiVersion"], api_version.as_str());
            assert_eq!(infra["kind"], "InfrastructureConfig");
            assert_eq!(control_plane["apiVersion"], api_version.as_str());
            assert_eq!(control_plane["kind"], "ControlPlaneConfig");
        }
    }

    #[test]
    fn test_emitted_blobs_are_deterministic() {
        let zones = zones(&["eu-central-1a", "eu-central-1b", "eu-central-1c"]);
        let first = Provider::Aws.infrastructure_config("10.250.0.0/16", &zones).unwrap();
        let second = Provider::Aws.infrastructure_config("10.250.0.0/16", &zones).unwrap();
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_gcp_control_plane_without_zones_fails() {
        let err = Provider::Gcp.control_plane_config(&[]).unwrap_err();
        assert!(matches!(err, ConversionError::EmptyZones { .. }));
        assert!(Provider::Aws.control_plane_config(&[]).is_ok());
    }
}
