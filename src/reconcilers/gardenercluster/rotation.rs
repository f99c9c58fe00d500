// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubeconfig rotation policy.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::context::RotationSettings;

/// What the kubeconfig controller does with the companion Secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationDecision {
    /// No Secret exists yet.
    Create,

    /// Forced rotation: drop the kubeconfig and its `last-sync` first.
    Revoke,

    /// Forced rotation: the Secret is already revoked, clear the request.
    RemoveForceAnnotation,

    /// Fetch a fresh kubeconfig into the existing Secret.
    Rotate(RotationReason),

    /// Leave the Secret untouched and come back later.
    Skip { requeue_after: Duration },
}

/// Why an existing Secret is rotated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationReason {
    MissingLastSync,
    Expired,
}

/// State of the companion Secret relevant for rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecretState {
    Missing,
    Present {
        last_sync: Option<DateTime<Utc>>,
        has_kubeconfig: bool,
    },
}

/// Decides the next action from the force annotation, the Secret and the clock.
#[must_use]
pub fn rotation_decision(
    force_rotation: bool,
    secret: SecretState,
    now: DateTime<Utc>,
    settings: &RotationSettings,
) -> RotationDecision {
    let (last_sync, has_kubeconfig) = match secret {
        SecretState::Missing if force_rotation => return RotationDecision::RemoveForceAnnotation,
        SecretState::Missing => return RotationDecision::Create,
        SecretState::Present {
            last_sync,
            has_kubeconfig,
        } => (last_sync, has_kubeconfig),
    };

    if force_rotation {
        return if has_kubeconfig || last_sync.is_some() {
            RotationDecision::Revoke
        } else {
            RotationDecision::RemoveForceAnnotation
        };
    }

    let Some(last_sync) = last_sync else {
        return RotationDecision::Rotate(RotationReason::MissingLastSync);
    };

    // A last-sync in the future counts as freshly synced.
    let elapsed = (now - last_sync).to_std().unwrap_or(Duration::ZERO);
    let threshold = settings.threshold();
    if elapsed >= threshold {
        return RotationDecision::Rotate(RotationReason::Expired);
    }

    RotationDecision::Skip {
        requeue_after: (threshold - elapsed).max(settings.minimal_rotation_time),
    }
}

/// Parses the `last-sync` annotation value.
#[must_use]
pub fn parse_last_sync(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|time| time.with_timezone(&Utc))
}

#[cfg(test)]
#[path = "rotation_tests.rs"]
mod rotation_tests;
