// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use super::super::*;
    use std::io::Write;

    const CONFIG: &str = r#"{
      "converter": {
        "kubernetes": {
          "defaultVersion": "1.30",
          "enableKubernetesVersionAutoUpdate": true,
          "enableMachineImageVersionAutoUpdate": false,
          "defaultOperatorOidc": {
            "clientID": "operator-client",
            "groupsClaim": "groups",
            "issuerURL": "https://operator.example.com",
            "signingAlgs": ["RS256"],
            "usernameClaim": "sub",
            "usernamePrefix": "-"
          }
        },
        "dns": {"secretName": "dns-secret", "domainPrefix": "dev.kyma.example", "providerType": "aws-route53"},
        "provider": {"aws": {"enableIMDSv2": true}},
        "machineImage": {"defaultName": "gardenlinux", "defaultVersion": "1592.1.0"},
        "gardener": {"projectName": "kyma-dev"},
        "auditLogging": {"policyConfigMapName": "audit-policy", "tenantConfigPath": "/config/tenants.json"}
      }
    }"#;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_json(CONFIG).unwrap();
        let converter = &config.converter;

        assert_eq!(converter.kubernetes.default_version, "1.30");
        assert!(converter.kubernetes.enable_kubernetes_version_auto_update);
        assert!(converter.provider.aws.enable_imdsv2);
        assert_eq!(converter.dns.domain_prefix, "dev.kyma.example");
        assert_eq!(converter.machine_image.default_name, "gardenlinux");
        assert_eq!(converter.audit_logging.policy_config_map_name, "audit-policy");
        assert_eq!(converter.project_namespace(), "garden-kyma-dev");
        assert!(config.cluster.default_shared_ias_tenant.is_none());
    }

    #[test]
    fn test_default_oidc_falls_back_to_operator_oidc() {
        let config = Config::from_json(CONFIG).unwrap();
        assert_eq!(config.converter.default_oidc().client_id, "operator-client");
    }

    #[test]
    fn test_shared_ias_tenant_takes_precedence() {
        let mut value: serde_json::Value = serde_json::from_str(CONFIG).unwrap();
        value["cluster"] = serde_json::json!({
            "defaultSharedIASTenant": {"clientID": "ias-client", "issuerURL": "https://ias.example.com"}
        });

        let config = Config::from_json(&value.to_string()).unwrap();
        assert_eq!(config.converter.default_oidc().client_id, "ias-client");
        assert_eq!(
            config.converter.default_oidc().issuer_url,
            "https://ias.example.com"
        );
    }

    #[test]
    fn test_to_oidc_config_omits_empty_fields() {
        let provider = OidcProviderConfig {
            client_id: "client".into(),
            issuer_url: "https://issuer".into(),
            ..OidcProviderConfig::default()
        };
        let oidc = provider.to_oidc_config();
        assert_eq!(oidc.client_id.as_deref(), Some("client"));
        assert_eq!(oidc.issuer_url.as_deref(), Some("https://issuer"));
        assert!(oidc.groups_claim.is_none());
        assert!(oidc.signing_algs.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.converter.gardener.project_name, "kyma-dev");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = Config::load(std::path::Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read configuration file"));
    }

    #[test]
    fn test_missing_required_section_fails() {
        assert!(Config::from_json(r#"{"converter": {}}"#).is_err());
    }
}
