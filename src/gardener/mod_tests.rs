// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use crate::gardener::*;

    const SHOOT_YAML: &str = r#"
apiVersion: core.gardener.cloud/v1beta1
kind: Shoot
metadata:
  name: c-12345
  namespace: garden-kyma-dev
  generation: 4
spec:
  cloudProfileName: aws
  region: eu-central-1
  seedName: aws-eu2
  kubernetes:
    version: "1.30"
    kubeAPIServer:
      oidcConfig:
        clientID: client
        issuerURL: https://issuer.example.com
  provider:
    type: aws
    workers:
      - name: cpu-worker-0
        machine:
          type: m6i.large
          image:
            name: gardenlinux
        minimum: 3
        maximum: 20
        volume:
          type: gp3
          size: 50Gi
        zones: [eu-central-1a]
  extensions:
    - type: shoot-oidc-service
      disabled: false
  addons:
    nginxIngress:
      enabled: false
status:
  lastOperation:
    type: Reconcile
    state: Failed
    description: infrastructure failed
    progress: 40
  lastErrors:
    - description: rate limited
      codes: [ERR_INFRA_RATE_LIMITS_EXCEEDED]
    - description: other
      codes: [ERR_CONFIGURATION_PROBLEM]
"#;

    #[test]
    fn test_shoot_parses_and_ignores_unknown_fields() {
        let shoot: Shoot = serde_yaml::from_str(SHOOT_YAML).unwrap();

        assert_eq!(shoot.spec.cloud_profile_name.as_deref(), Some("aws"));
        let worker = &shoot.spec.provider.workers[0];
        assert_eq!(worker.volume.as_ref().unwrap().volume_size, "50Gi");
        assert_eq!(worker.machine.image.as_ref().unwrap().version, None);
        assert_eq!(
            shoot
                .spec
                .kubernetes
                .kube_api_server
                .as_ref()
                .and_then(|api| api.oidc_config.as_ref())
                .and_then(|oidc| oidc.client_id.as_deref()),
            Some("client")
        );
    }

    #[test]
    fn test_shoot_status_helpers() {
        let shoot: Shoot = serde_yaml::from_str(SHOOT_YAML).unwrap();

        let last = shoot.last_operation().unwrap();
        assert_eq!(last.r#type, LastOperationType::Reconcile);
        assert_eq!(last.state, LastOperationState::Failed);
        assert_eq!(
            shoot.error_codes(),
            vec!["ERR_INFRA_RATE_LIMITS_EXCEEDED", "ERR_CONFIGURATION_PROBLEM"]
        );
        assert_eq!(shoot.seed_name(), Some("aws-eu2"));
        assert!(shoot.extension("shoot-oidc-service").is_some());
        assert!(shoot.extension("shoot-dns-service").is_none());
    }

    #[test]
    fn test_unknown_operation_values_are_tolerated() {
        let yaml = r#"
type: Hibernate
state: Interrupted
"#;
        let op: LastOperation = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(op.r#type, LastOperationType::Unknown);
        assert_eq!(op.state, LastOperationState::Unknown);
    }

    #[test]
    fn test_unset_fields_are_not_serialized() {
        let shoot = Shoot::new("c-1", ShootSpec::default());
        let json = serde_json::to_value(&shoot).unwrap();
        let spec = json["spec"].as_object().unwrap();

        assert!(!spec.contains_key("dns"));
        assert!(!spec.contains_key("extensions"));
        assert!(!spec.contains_key("seedName"));
        assert_eq!(json["apiVersion"], "core.gardener.cloud/v1beta1");
    }

    #[test]
    fn test_signing_algorithm_parsing() {
        assert_eq!("RS256".parse::<SigningAlgorithm>(), Ok(SigningAlgorithm::RS256));
        assert_eq!("PS512".parse::<SigningAlgorithm>(), Ok(SigningAlgorithm::PS512));
        assert!("HS256".parse::<SigningAlgorithm>().is_err());
    }

    #[test]
    fn test_openid_connect_wire_shape() {
        let oidc = OpenIDConnect::new(
            "kyma-oidc-0",
            OpenIDConnectSpec {
                issuer_url: "https://issuer".into(),
                client_id: "client".into(),
                supported_signing_algs: vec![SigningAlgorithm::RS256],
                ..OpenIDConnectSpec::default()
            },
        );
        let json = serde_json::to_value(&oidc).unwrap();
        assert_eq!(json["apiVersion"], "authentication.gardener.cloud/v1alpha1");
        assert_eq!(json["spec"]["issuerURL"], "https://issuer");
        assert_eq!(json["spec"]["clientID"], "client");
        assert_eq!(json["spec"]["supportedSigningAlgs"][0], "RS256");
    }
}
