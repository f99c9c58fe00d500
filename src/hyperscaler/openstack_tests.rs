// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_infrastructure_config() {
        let json = serde_json::to_value(infrastructure_config("10.250.0.0/16")).unwrap();
        assert_eq!(json["apiVersion"], API_VERSION);
        assert_eq!(json["floatingPoolName"], "FloatingIP-external-kyma-01");
        assert_eq!(json["networks"]["workers"], "10.250.0.0/16");
    }

    #[test]
    fn test_control_plane_config() {
        let json = serde_json::to_value(control_plane_config()).unwrap();
        assert_eq!(json["kind"], "ControlPlaneConfig");
        assert_eq!(json["loadBalancerProvider"], "f5");
    }
}
