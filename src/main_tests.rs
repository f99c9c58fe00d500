// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `main.rs` - flag parsing and shutdown handling

#[cfg(test)]
mod tests {
    use super::super::*;
    use std::time::Duration as StdDuration;
    use tokio::time::timeout;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["infrastructure-manager"]).unwrap();

        assert_eq!(
            args.kubeconfig_rotation_period,
            StdDuration::from_secs(86_400)
        );
        assert!((args.kubeconfig_rotation_ratio - 0.95).abs() < f64::EPSILON);
        assert_eq!(args.gardener_request_timeout, StdDuration::from_secs(60));
        assert!(args.audit_log_mandatory);
        assert!(args.persist_shoot_path.is_none());
        assert!(args.gardener_project_name.is_none());
        assert_eq!(args.metrics_bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from([
            "infrastructure-manager",
            "--kubeconfig-rotation-period=1h",
            "--kubeconfig-rotation-ratio=0.5",
            "--gardener-request-timeout=2m",
            "--audit-log-mandatory=false",
            "--persist-shoot-path=/tmp/shoots",
            "--gardener-project-name=kyma-dev",
        ])
        .unwrap();

        assert_eq!(args.kubeconfig_rotation_period, StdDuration::from_secs(3600));
        assert_eq!(args.gardener_request_timeout, StdDuration::from_secs(120));
        assert!(!args.audit_log_mandatory);
        assert_eq!(
            args.persist_shoot_path.as_deref(),
            Some(std::path::Path::new("/tmp/shoots"))
        );
        assert_eq!(args.gardener_project_name.as_deref(), Some("kyma-dev"));

        let settings = args.settings().unwrap();
        assert_eq!(settings.rotation.threshold(), StdDuration::from_secs(1800));
    }

    #[test]
    fn test_invalid_duration_is_rejected() {
        let result = Args::try_parse_from([
            "infrastructure-manager",
            "--kubeconfig-rotation-period=soon",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_ratio_out_of_range_fails_settings() {
        let args = Args::try_parse_from([
            "infrastructure-manager",
            "--kubeconfig-rotation-ratio=1.5",
        ])
        .unwrap();
        assert!(args.settings().is_err());
    }

    #[tokio::test]
    async fn test_health_and_metrics_handlers() {
        metrics::record_reconciliation_success("Runtime", StdDuration::from_millis(5));
        let body = metrics_handler().await.unwrap();
        assert!(body.contains("im_"));
    }

    /// Test that SIGTERM signal handler can be created on Unix platforms
    #[tokio::test]
    #[cfg(unix)]
    async fn test_sigterm_signal_handler_creation() {
        use tokio::signal::unix::{signal, SignalKind};

        let result = signal(SignalKind::terminate());
        assert!(
            result.is_ok(),
            "Should be able to create SIGTERM signal handler"
        );
    }

    #[tokio::test]
    async fn test_shutdown_signal_pending_without_signal() {
        let result = timeout(StdDuration::from_millis(100), shutdown_signal()).await;
        assert!(
            result.is_err(),
            "shutdown_signal() should not resolve when no signal is sent"
        );
    }
}
