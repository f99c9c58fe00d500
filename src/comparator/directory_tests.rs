// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::converter::Converter;
    use crate::test_support::{aws_runtime, converter_config};
    use tempfile::TempDir;

    fn write_shoot(dir: &Path, file: &str, shoot: &Shoot) {
        std::fs::write(dir.join(file), serde_yaml::to_string(shoot).unwrap()).unwrap();
    }

    fn converted() -> Shoot {
        Converter::new(converter_config())
            .to_shoot(&aws_runtime())
            .unwrap()
    }

    #[test]
    fn test_equal_directories() {
        let left = TempDir::new().unwrap();
        let right = TempDir::new().unwrap();
        let shoot = converted();
        write_shoot(left.path(), "c-12345.yaml", &shoot);
        write_shoot(right.path(), "c-12345.yaml", &shoot);

        let report = compare_directories(left.path(), right.path()).unwrap();
        assert_eq!(report.compared, 1);
        assert_eq!(report.equal, 1);
        assert!(report.is_equal());
    }

    #[test]
    fn test_one_sided_files_are_listed() {
        let left = TempDir::new().unwrap();
        let right = TempDir::new().unwrap();
        let shoot = converted();
        write_shoot(left.path(), "a.yaml", &shoot);
        write_shoot(right.path(), "b.yaml", &shoot);
        std::fs::write(right.path().join("notes.txt"), "ignored").unwrap();

        let report = compare_directories(left.path(), right.path()).unwrap();
        assert_eq!(report.compared, 0);
        assert_eq!(report.only_left, vec!["a.yaml".to_string()]);
        assert_eq!(report.only_right, vec!["b.yaml".to_string()]);
        assert!(!report.is_equal());
    }

    #[test]
    fn test_differences_are_written_to_output() {
        let left = TempDir::new().unwrap();
        let right = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let expected = converted();
        let mut actual = converted();
        actual.spec.region = "eu-west-1".into();
        write_shoot(left.path(), "c-12345.yaml", &expected);
        write_shoot(right.path(), "c-12345.yaml", &actual);

        let report = compare_directories(left.path(), right.path()).unwrap();
        assert_eq!(report.differences.len(), 1);
        assert_eq!(report.differences[0].shoot_name, "c-12345");
        assert!(report.differences[0].message.contains("spec.region"));

        let report_path = write_report(&report, output.path()).unwrap();
        let written: Report =
            serde_yaml::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
        assert_eq!(written, report);

        let diff = std::fs::read_to_string(output.path().join("c-12345.diff")).unwrap();
        assert!(diff.contains("eu-west-1"));
    }

    #[test]
    fn test_unparseable_shoot_is_an_error() {
        let left = TempDir::new().unwrap();
        let right = TempDir::new().unwrap();
        std::fs::write(left.path().join("bad.yaml"), "spec: [").unwrap();
        std::fs::write(right.path().join("bad.yaml"), "spec: [").unwrap();

        let err = compare_directories(left.path(), right.path()).unwrap_err();
        assert!(matches!(err, ComparatorError::Parse { .. }));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let right = TempDir::new().unwrap();
        let err = compare_directories(Path::new("/nonexistent/left"), right.path()).unwrap_err();
        assert!(matches!(err, ComparatorError::Io { .. }));
    }

    fn shoot_yaml(cri: &str, architecture: &str) -> String {
        format!(
            r"apiVersion: core.gardener.cloud/v1beta1
kind: Shoot
metadata:
  name: c-12345
  namespace: garden-kyma-dev
  labels:
    account: account-1
    subaccount: subaccount-1
spec:
  region: eu-central-1
  kubernetes:
    version: '1.30'
  provider:
    type: aws
    workers:
      - name: cpu-worker-0
        minimum: 3
        maximum: 20
        cri:
          name: {cri}
        machine:
          type: m6i.large
          architecture: {architecture}
        zones:
          - eu-central-1a
"
        )
    }

    #[test]
    fn test_unmodelled_worker_fields_are_compared() {
        let left = TempDir::new().unwrap();
        let right = TempDir::new().unwrap();
        std::fs::write(left.path().join("c-12345.yaml"), shoot_yaml("containerd", "amd64")).unwrap();
        std::fs::write(right.path().join("c-12345.yaml"), shoot_yaml("docker", "amd64")).unwrap();

        let report = compare_directories(left.path(), right.path()).unwrap();
        assert_eq!(report.compared, 1);
        assert_eq!(report.equal, 0);
        assert_eq!(report.differences.len(), 1);
        assert_eq!(report.differences[0].shoot_name, "c-12345");
        assert!(report.differences[0].message.contains("spec.provider.workers"));
    }

    #[test]
    fn test_identical_raw_shoots_are_equal() {
        let left = TempDir::new().unwrap();
        let right = TempDir::new().unwrap();
        std::fs::write(left.path().join("c-12345.yaml"), shoot_yaml("containerd", "arm64")).unwrap();
        std::fs::write(right.path().join("c-12345.yaml"), shoot_yaml("containerd", "arm64")).unwrap();

        let report = compare_directories(left.path(), right.path()).unwrap();
        assert!(report.is_equal(), "{:?}", report.differences);
    }
}
