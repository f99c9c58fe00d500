// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_infrastructure_config_uses_node_cidr() {
        let json = serde_json::to_value(infrastructure_config("10.250.0.0/16")).unwrap();
        assert_eq!(json["apiVersion"], API_VERSION);
        assert_eq!(json["networks"]["workers"], "10.250.0.0/16");
        assert_eq!(json["networks"]["worker"], "10.250.0.0/16");
    }

    #[test]
    fn test_control_plane_uses_first_zone() {
        let zones = vec!["europe-west3-a".to_string(), "europe-west3-b".to_string()];
        let config = control_plane_config(&zones).unwrap();
        assert_eq!(config.zone, "europe-west3-a");
        assert_eq!(config.kind, "ControlPlaneConfig");
    }

    #[test]
    fn test_control_plane_requires_a_zone() {
        let err = control_plane_config(&[]).unwrap_err();
        assert!(matches!(err, ConversionError::EmptyZones { .. }));
    }
}
