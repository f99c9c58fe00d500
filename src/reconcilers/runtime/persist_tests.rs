// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::converter::Converter;
    use crate::test_support::{aws_runtime, converter_config};

    #[test]
    fn test_write_dumps_names_and_contents() {
        let dir = tempfile::tempdir().unwrap();
        let mut runtime = aws_runtime();
        runtime.metadata.namespace = Some("kcp-system".to_string());
        let shoot = Converter::new(converter_config()).to_shoot(&runtime).unwrap();

        let (shoot_path, runtime_path) = write_dumps(dir.path(), &runtime, &shoot).unwrap();

        assert_eq!(
            shoot_path.file_name().unwrap().to_str().unwrap(),
            format!("kcp-system-{}-shoot.yaml", runtime.name_any())
        );
        assert_eq!(
            runtime_path.file_name().unwrap().to_str().unwrap(),
            format!("kcp-system-{}-runtime.yaml", runtime.name_any())
        );

        let dumped: Shoot =
            serde_yaml::from_str(&std::fs::read_to_string(&shoot_path).unwrap()).unwrap();
        assert_eq!(dumped.spec, shoot.spec);
        let dumped: Runtime =
            serde_yaml::from_str(&std::fs::read_to_string(&runtime_path).unwrap()).unwrap();
        assert_eq!(dumped.spec, runtime.spec);
    }

    #[test]
    fn test_write_dumps_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("dumps").join("shoots");
        let runtime = aws_runtime();
        let shoot = Converter::new(converter_config()).to_shoot(&runtime).unwrap();

        write_dumps(&nested, &runtime, &shoot).unwrap();

        assert!(nested.is_dir());
    }
}
