// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for context.rs

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_default_rotation_settings() {
        let rotation = RotationSettings::default();
        assert_eq!(rotation.period, Duration::from_secs(86_400));
        assert!((rotation.ratio - 0.95).abs() < f64::EPSILON);
        assert_eq!(rotation.expiration_seconds(), 86_400);
    }

    #[test]
    fn test_threshold_is_ratio_of_period() {
        let rotation =
            RotationSettings::new(Duration::from_secs(3600), 0.95, Duration::from_secs(1)).unwrap();
        assert_eq!(rotation.threshold(), Duration::from_secs(3420));
    }

    #[test]
    fn test_ratio_out_of_range_is_rejected() {
        for ratio in [0.0, 1.0, 1.5, -0.1] {
            assert!(
                RotationSettings::new(Duration::from_secs(60), ratio, Duration::ZERO).is_err(),
                "ratio {ratio} should be rejected"
            );
        }
    }

    #[test]
    fn test_zero_period_is_rejected() {
        assert!(RotationSettings::new(Duration::ZERO, 0.5, Duration::ZERO).is_err());
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.gardener_request_timeout, Duration::from_secs(60));
        assert!(settings.audit_log_mandatory);
        assert!(settings.persist_shoot_path.is_none());
    }
}
