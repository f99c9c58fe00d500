// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use crate::crd::*;
    use kube::{CustomResourceExt, Resource};

    const RUNTIME_YAML: &str = r#"
apiVersion: infrastructuremanager.kyma-project.io/v1
kind: Runtime
metadata:
  name: runtime-1
  namespace: kcp-system
  labels:
    kyma-project.io/runtime-id: runtime-1
    operator.kyma-project.io/created-by-migrator: "true"
spec:
  shoot:
    name: c-12345
    purpose: production
    region: eu-central-1
    platformRegion: cf-eu11
    secretBindingName: aws-credentials
    kubernetes:
      kubeAPIServer:
        oidcConfig:
          clientID: client
          issuerURL: https://issuer.example.com
        additionalOidcConfig:
          - clientID: extra
            issuerURL: https://extra.example.com
    provider:
      type: aws
      workers:
        - name: cpu-worker-0
          machine:
            type: m6i.large
          minimum: 3
          maximum: 20
          maxSurge: 3
          zones: [eu-central-1a, eu-central-1b]
    networking:
      nodes: 10.250.0.0/16
      pods: 100.64.0.0/12
      services: 100.104.0.0/13
  security:
    administrators: [admin@example.com]
    networking:
      filter:
        egress:
          enabled: true
status:
  state: Ready
  conditions:
    - type: Provisioned
      status: "True"
      reason: ShootCreationCompleted
      lastTransitionTime: "2025-01-01T00:00:00Z"
"#;

    #[test]
    fn test_runtime_parses_from_yaml() {
        let runtime: Runtime = serde_yaml::from_str(RUNTIME_YAML).unwrap();

        assert_eq!(runtime.spec.shoot.name, "c-12345");
        assert_eq!(runtime.spec.shoot.platform_region, "cf-eu11");
        assert_eq!(runtime.spec.shoot.provider.workers[0].zones.len(), 2);
        assert_eq!(
            runtime.spec.shoot.kubernetes.kube_api_server.oidc_config.client_id.as_deref(),
            Some("client")
        );
        assert_eq!(
            runtime
                .spec
                .shoot
                .kubernetes
                .kube_api_server
                .additional_oidc_config
                .as_ref()
                .map(Vec::len),
            Some(1)
        );
        assert!(runtime.spec.security.networking.filter.egress.enabled);
        assert!(runtime.spec.security.networking.filter.ingress.is_none());

        let status = runtime.status.as_ref().unwrap();
        assert_eq!(status.state, Some(RuntimeState::Ready));
        assert_eq!(
            status.conditions[0].last_transition_time.as_deref(),
            Some("2025-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_runtime_label_helpers() {
        let runtime: Runtime = serde_yaml::from_str(RUNTIME_YAML).unwrap();
        assert_eq!(runtime.runtime_id(), Some("runtime-1"));
        assert!(runtime.is_created_by_migrator());
        assert_eq!(runtime.label("missing"), None);
    }

    #[test]
    fn test_runtime_state_display_matches_wire_format() {
        for state in [
            RuntimeState::Pending,
            RuntimeState::Ready,
            RuntimeState::Failed,
            RuntimeState::Terminating,
        ] {
            let wire = serde_json::to_value(state).unwrap();
            assert_eq!(wire, serde_json::Value::String(state.to_string()));
        }
    }

    #[test]
    fn test_gardener_cluster_state_display_matches_wire_format() {
        for state in [
            GardenerClusterState::Ready,
            GardenerClusterState::Processing,
            GardenerClusterState::Error,
            GardenerClusterState::Deleting,
        ] {
            let wire = serde_json::to_value(state).unwrap();
            assert_eq!(wire, serde_json::Value::String(state.to_string()));
        }
    }

    #[test]
    fn test_condition_serializes_camel_case() {
        let condition = Condition {
            r#type: "Provisioned".into(),
            status: "False".into(),
            reason: Some("ConversionError".into()),
            message: Some("unsupported provider type 'alicloud'".into()),
            last_transition_time: Some("2025-01-01T00:00:00Z".into()),
        };
        let json = serde_json::to_value(&condition).unwrap();
        assert_eq!(json["type"], "Provisioned");
        assert_eq!(json["lastTransitionTime"], "2025-01-01T00:00:00Z");
    }

    #[test]
    fn test_crd_metadata() {
        assert_eq!(Runtime::kind(&()), "Runtime");
        assert_eq!(Runtime::group(&()), "infrastructuremanager.kyma-project.io");
        assert_eq!(GardenerCluster::kind(&()), "GardenerCluster");

        let crd = Runtime::crd();
        assert_eq!(
            crd.metadata.name.as_deref(),
            Some("runtimes.infrastructuremanager.kyma-project.io")
        );
        let crd = GardenerCluster::crd();
        assert_eq!(
            crd.metadata.name.as_deref(),
            Some("gardenerclusters.infrastructuremanager.kyma-project.io")
        );
    }

    #[test]
    fn test_metric_kind_labels_match_resource_kinds() {
        use crate::constants::{KIND_GARDENER_CLUSTER, KIND_RUNTIME, KIND_SHOOT};
        use crate::gardener::Shoot;

        assert_eq!(Runtime::kind(&()), KIND_RUNTIME);
        assert_eq!(GardenerCluster::kind(&()), KIND_GARDENER_CLUSTER);
        assert_eq!(Shoot::kind(&()), KIND_SHOOT);
    }
}
