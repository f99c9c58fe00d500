// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `retry.rs`

#[cfg(test)]
mod tests {
    use super::super::{
        default_backoff, is_not_found, is_retryable_error,
        retry_workload_call, workload_backoff,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(Box::new(kube::core::Status {
            status: Some(kube::core::response::StatusSummary::Failure),
            message: format!("{reason} from test"),
            reason: reason.to_string(),
            code,
            metadata: None,
            details: None,
        }))
    }

    #[test]
    fn test_backoff_configuration() {
        let backoff = default_backoff();
        assert_eq!(backoff.initial_interval, Duration::from_millis(100));
        assert_eq!(backoff.max_interval, Duration::from_secs(15));
        assert_eq!(backoff.max_elapsed_time, Some(Duration::from_secs(120)));

        let workload = workload_backoff();
        assert_eq!(workload.initial_interval, Duration::from_millis(200));
        assert_eq!(workload.max_interval, Duration::from_secs(5));
        assert!(
            workload.max_elapsed_time < backoff.max_elapsed_time,
            "Workload calls run inside a reconcile and must give up sooner"
        );
    }

    #[test]
    fn test_next_backoff_grows_and_caps() {
        let mut backoff = workload_backoff();
        backoff.randomization_factor = 0.0;

        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(200)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(400)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(800)));
        for _ in 0..10 {
            backoff.next_backoff();
        }
        assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let mut backoff = default_backoff();
        let first = backoff.next_backoff().unwrap();
        assert!(first >= Duration::from_millis(90) && first <= Duration::from_millis(110));
    }

    #[test]
    fn test_retryable_status_codes() {
        assert!(is_retryable_error(&api_error(429, "TooManyRequests")));
        assert!(is_retryable_error(&api_error(500, "InternalError")));
        assert!(is_retryable_error(&api_error(503, "ServiceUnavailable")));
        assert!(!is_retryable_error(&api_error(400, "BadRequest")));
        assert!(!is_retryable_error(&api_error(404, "NotFound")));
        assert!(!is_retryable_error(&api_error(409, "Conflict")));
    }

    #[test]
    fn test_service_errors_retryable() {
        let service_error: Box<dyn std::error::Error + Send + Sync> = Box::new(
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Connection failed"),
        );
        assert!(is_retryable_error(&kube::Error::Service(service_error)));
    }

    #[test]
    fn test_not_found_detection() {
        assert!(is_not_found(&api_error(404, "NotFound")));
        assert!(!is_not_found(&api_error(409, "Conflict")));
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_error() {
        let calls = AtomicUsize::new(0);
        let result = retry_workload_call(
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        Err(api_error(503, "ServiceUnavailable"))
                    } else {
                        Ok("bound")
                    }
                }
            },
            "create binding",
        )
        .await;

        assert_eq!(result.unwrap(), "bound");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_fails_fast_on_client_error() {
        let calls = AtomicUsize::new(0);
        let result: anyhow::Result<()> = retry_workload_call(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(api_error(403, "Forbidden")) }
            },
            "delete binding",
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
