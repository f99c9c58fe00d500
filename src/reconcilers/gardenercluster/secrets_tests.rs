// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::crd::{GardenerClusterSpec, KubeconfigReference, SecretReference, ShootReference};
    use crate::labels::{LABEL_GLOBAL_ACCOUNT_ID, LABEL_RUNTIME_ID};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use chrono::TimeZone;

    fn cluster() -> GardenerCluster {
        GardenerCluster {
            metadata: ObjectMeta {
                name: Some("runtime-1".to_string()),
                namespace: Some("kcp-system".to_string()),
                labels: Some(BTreeMap::from([
                    (LABEL_RUNTIME_ID.to_string(), "runtime-1".to_string()),
                    (LABEL_GLOBAL_ACCOUNT_ID.to_string(), "ga-1".to_string()),
                    ("unrelated".to_string(), "x".to_string()),
                ])),
                ..Default::default()
            },
            spec: GardenerClusterSpec {
                shoot: ShootReference {
                    name: "c-12345".to_string(),
                },
                kubeconfig: KubeconfigReference {
                    secret: SecretReference {
                        name: "kubeconfig-runtime-1".to_string(),
                        namespace: "kcp-system".to_string(),
                        key: "config".to_string(),
                    },
                },
            },
            status: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_selectors() {
        assert_eq!(shoot_selector("c-1"), "kyma-project.io/shoot-name=c-1");
        assert_eq!(
            cluster_selector("runtime-1"),
            "operator.kyma-project.io/cluster-name=runtime-1"
        );
    }

    #[test]
    fn test_single_secret() {
        assert!(single_secret(vec![], "x=y").unwrap().is_none());
        assert!(single_secret(vec![Secret::default()], "x=y").unwrap().is_some());

        let err = single_secret(vec![Secret::default(), Secret::default()], "x=y").unwrap_err();
        assert!(err.to_string().contains("found 2 secrets"));
    }

    #[test]
    fn test_secret_labels() {
        let labels = secret_labels(&cluster());
        assert_eq!(labels[LABEL_RUNTIME_ID], "runtime-1");
        assert_eq!(labels[LABEL_GLOBAL_ACCOUNT_ID], "ga-1");
        assert_eq!(labels[LABEL_SHOOT_NAME], "c-12345");
        assert_eq!(labels[LABEL_CLUSTER_NAME], "runtime-1");
        assert_eq!(labels[LABEL_MANAGED_BY], "infrastructure-manager");
        assert!(!labels.contains_key("unrelated"));
    }

    #[test]
    fn test_build_secret() {
        let secret = build_secret(&cluster(), b"apiVersion: v1", now());
        assert_eq!(secret.metadata.name.as_deref(), Some("kubeconfig-runtime-1"));
        assert_eq!(secret.metadata.namespace.as_deref(), Some("kcp-system"));
        assert_eq!(
            secret.annotations()[ANNOTATION_LAST_SYNC],
            "2025-03-01T12:00:00Z"
        );
        assert_eq!(
            secret.data.as_ref().unwrap()["config"].0,
            b"apiVersion: v1".to_vec()
        );
    }

    #[test]
    fn test_rotation_patch_encodes_kubeconfig() {
        let patch = rotation_patch(&cluster(), b"kubeconfig", now());
        assert_eq!(
            patch["metadata"]["annotations"][ANNOTATION_LAST_SYNC],
            "2025-03-01T12:00:00Z"
        );
        assert_eq!(patch["data"]["config"], STANDARD.encode("kubeconfig"));
    }

    #[test]
    fn test_revocation_patch_nulls_key_and_annotation() {
        let patch = revocation_patch(&cluster());
        assert!(patch["data"]["config"].is_null());
        assert!(patch["data"].as_object().unwrap().contains_key("config"));
        assert!(patch["metadata"]["annotations"]
            .as_object()
            .unwrap()
            .contains_key(ANNOTATION_LAST_SYNC));
        assert!(patch["metadata"].get("labels").is_none());
        assert_eq!(patch["metadata"]["annotations"].as_object().unwrap().len(), 1);
        assert_eq!(patch["data"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_force_rotation_removal_patch_only_clears_annotation() {
        let patch = force_rotation_removal_patch();
        let annotations = patch["metadata"]["annotations"].as_object().unwrap();
        assert_eq!(annotations.len(), 1);
        assert!(annotations[ANNOTATION_FORCE_KUBECONFIG_ROTATION].is_null());
        assert_eq!(patch.as_object().unwrap().len(), 1);
        assert_eq!(patch["metadata"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_secret_state() {
        assert_eq!(secret_state(None, "config"), SecretState::Missing);

        let fresh = build_secret(&cluster(), b"kubeconfig", now());
        assert_eq!(
            secret_state(Some(&fresh), "config"),
            SecretState::Present {
                last_sync: Some(now()),
                has_kubeconfig: true
            }
        );

        let mut revoked = fresh.clone();
        revoked.metadata.annotations = None;
        revoked.data = Some(BTreeMap::new());
        assert_eq!(
            secret_state(Some(&revoked), "config"),
            SecretState::Present {
                last_sync: None,
                has_kubeconfig: false
            }
        );

        let mut garbled = fresh;
        garbled
            .annotations_mut()
            .insert(ANNOTATION_LAST_SYNC.to_string(), "not a time".to_string());
        assert_eq!(
            secret_state(Some(&garbled), "config"),
            SecretState::Present {
                last_sync: None,
                has_kubeconfig: true
            }
        );
    }
}
