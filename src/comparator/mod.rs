// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Structural comparison of two shoots.
//!
//! Used to verify that a freshly converted shoot is semantically equal to the
//! one stored in Gardener. Annotations are never compared and labels only need
//! to carry `account` and `subaccount` on the actual side.

pub mod directory;
pub mod matchers;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ComparatorError;
use crate::gardener::Shoot;
use crate::labels::{SHOOT_LABEL_ACCOUNT, SHOOT_LABEL_SUBACCOUNT};
use matchers::MatchResult;

type Matcher = fn(Option<&Value>, Option<&Value>) -> MatchResult;

/// Compared JSON pointers and their matcher.
const FIELDS: [(&str, Matcher); 25] = [
    ("/metadata/name", matchers::equal),
    ("/metadata/namespace", matchers::equal),
    ("/spec/cloudProfileName", matchers::equal),
    ("/spec/dns", matchers::equal),
    ("/spec/hibernation", matchers::equal),
    ("/spec/kubernetes/version", matchers::equal),
    ("/spec/kubernetes/enableStaticTokenKubeconfig", matchers::equal),
    ("/spec/networking/type", matchers::equal),
    ("/spec/networking/nodes", matchers::equal),
    ("/spec/networking/pods", matchers::equal),
    ("/spec/networking/services", matchers::equal),
    ("/spec/maintenance/autoUpdate/kubernetesVersion", matchers::equal),
    ("/spec/maintenance/autoUpdate/machineImageVersion", matchers::equal),
    ("/spec/monitoring", matchers::equal),
    ("/spec/provider/type", matchers::equal),
    ("/spec/provider/workers", matchers::equal),
    ("/spec/provider/controlPlaneConfig", matchers::raw_blob),
    ("/spec/provider/infrastructureConfig", matchers::raw_blob),
    ("/spec/purpose", matchers::equal),
    ("/spec/region", matchers::equal),
    ("/spec/secretBindingName", matchers::equal),
    ("/spec/tolerations", matchers::equal),
    ("/spec/exposureClassName", matchers::equal),
    ("/spec/controlPlane", matchers::equal),
    ("/spec/credentialsBindingName", matchers::equal),
];

/// A single field that did not match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difference {
    pub path: String,
    pub message: String,
}

/// Outcome of comparing two shoots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShootComparison {
    pub equal: bool,
    pub differences: Vec<Difference>,
}

/// Compares `expected` against `actual`.
///
/// # Errors
///
/// Returns an error if either shoot cannot be serialized.
pub fn compare_shoots(expected: &Shoot, actual: &Shoot) -> Result<ShootComparison, ComparatorError> {
    let left = serde_json::to_value(expected)?;
    let right = serde_json::to_value(actual)?;
    Ok(compare_values(&left, &right))
}

/// Compares two shoots already rendered as JSON values.
#[must_use]
pub fn compare_values(expected: &Value, actual: &Value) -> ShootComparison {
    let mut differences = Vec::new();
    let mut record = |path: &str, result: MatchResult| {
        if let Err(message) = result {
            differences.push(Difference {
                path: path.trim_start_matches('/').replace('/', "."),
                message,
            });
        }
    };

    record(
        "/metadata/labels",
        matchers::has_keys(
            actual.pointer("/metadata/labels"),
            &[SHOOT_LABEL_ACCOUNT, SHOOT_LABEL_SUBACCOUNT],
        ),
    );

    for (path, matcher) in FIELDS {
        record(path, matcher(expected.pointer(path), actual.pointer(path)));
    }

    record(
        "/spec/extensions",
        matchers::extensions(
            expected.pointer("/spec/extensions"),
            actual.pointer("/spec/extensions"),
        ),
    );

    ShootComparison {
        equal: differences.is_empty(),
        differences,
    }
}
