// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use super::super::decode_kubeconfig;
    use crate::errors::KubeconfigError;
    use crate::gardener::{AdminKubeconfigRequest, AdminKubeconfigRequestStatus};
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    fn response(kubeconfig: &str) -> AdminKubeconfigRequest {
        AdminKubeconfigRequest {
            status: Some(AdminKubeconfigRequestStatus {
                kubeconfig: kubeconfig.to_string(),
                expiration_timestamp: None,
            }),
            ..AdminKubeconfigRequest::new(600)
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(AdminKubeconfigRequest::new(86400)).unwrap();
        assert_eq!(body["apiVersion"], "authentication.gardener.cloud/v1alpha1");
        assert_eq!(body["kind"], "AdminKubeconfigRequest");
        assert_eq!(body["spec"]["expirationSeconds"], 86400);
        assert!(body.get("status").is_none());
    }

    #[test]
    fn test_decode_kubeconfig() {
        let encoded = STANDARD.encode("apiVersion: v1\nkind: Config\n");
        let bytes = decode_kubeconfig("c-1", &response(&encoded)).unwrap();
        assert_eq!(bytes, b"apiVersion: v1\nkind: Config\n");
    }

    #[test]
    fn test_decode_empty_kubeconfig_fails() {
        let err = decode_kubeconfig("c-1", &response("")).unwrap_err();
        assert!(matches!(err, KubeconfigError::EmptyKubeconfig { .. }));

        let err = decode_kubeconfig("c-1", &AdminKubeconfigRequest::new(600)).unwrap_err();
        assert!(matches!(err, KubeconfigError::EmptyKubeconfig { .. }));
    }

    #[test]
    fn test_decode_invalid_base64_fails() {
        let err = decode_kubeconfig("c-1", &response("not base64!")).unwrap_err();
        assert!(matches!(err, KubeconfigError::Decode { .. }));
    }
}
