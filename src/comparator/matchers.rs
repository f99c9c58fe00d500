// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Field matchers used by the shoot comparator.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Result of matching one field.
pub type MatchResult = Result<(), String>;

/// Strict equality, treating a missing field and `null` as the same.
pub fn equal(expected: Option<&Value>, actual: Option<&Value>) -> MatchResult {
    let expected = expected.unwrap_or(&Value::Null);
    let actual = actual.unwrap_or(&Value::Null);
    if expected == actual {
        Ok(())
    } else {
        Err(format!("expected {expected}, got {actual}"))
    }
}

/// The actual object must carry every listed key.
pub fn has_keys(actual: Option<&Value>, keys: &[&str]) -> MatchResult {
    let missing: Vec<&str> = keys
        .iter()
        .copied()
        .filter(|key| actual.and_then(|map| map.get(key)).is_none())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("missing keys {}", missing.join(", ")))
    }
}

/// Digest of a raw blob whose bytes were sorted first.
///
/// Key order does not matter under this relation, but neither does any other
/// byte permutation: `{"a":"b"}` and `{"b":"a"}` share a digest.
///
/// The digest is only ever compared for equality, so two blobs match exactly
/// when their sorted bytes are equal. The hash algorithm does not change that.
#[must_use]
pub fn sorted_bytes_digest(value: &Value) -> String {
    let mut bytes = serde_json::to_vec(value).unwrap_or_default();
    bytes.sort_unstable();
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    format!("{:x}", hasher.finalize())
}

/// Compares two raw provider config blobs by [`sorted_bytes_digest`].
pub fn raw_blob(expected: Option<&Value>, actual: Option<&Value>) -> MatchResult {
    match (expected, actual) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ok(()),
        (Some(expected), Some(actual)) => {
            let left = sorted_bytes_digest(expected);
            let right = sorted_bytes_digest(actual);
            if left == right {
                Ok(())
            } else {
                Err(format!("content digest {left} differs from {right}"))
            }
        }
        (Some(_), None) => Err("expected a value, got none".to_string()),
        (None, Some(_)) => Err("expected no value, got one".to_string()),
    }
}

/// Compares extension lists regardless of order, pairing entries by `type`.
pub fn extensions(expected: Option<&Value>, actual: Option<&Value>) -> MatchResult {
    let left = sorted_by_type(expected);
    let right = sorted_by_type(actual);

    if left.len() != right.len() {
        return Err(format!(
            "expected {} extensions [{}], got {} [{}]",
            left.len(),
            types(&left),
            right.len(),
            types(&right)
        ));
    }

    let mismatches: Vec<String> = left
        .iter()
        .zip(&right)
        .filter(|(l, r)| l != r)
        .map(|(l, r)| format!("extension {} differs: expected {l}, got {r}", type_of(l)))
        .collect();

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(mismatches.join("; "))
    }
}

fn sorted_by_type(value: Option<&Value>) -> Vec<Value> {
    let mut items: Vec<Value> = value
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    items.sort_by(|a, b| type_of(a).cmp(type_of(b)));
    items
}

fn type_of(value: &Value) -> &str {
    value.get("type").and_then(Value::as_str).unwrap_or_default()
}

fn types(items: &[Value]) -> String {
    items.iter().map(type_of).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
#[path = "matchers_tests.rs"]
mod matchers_tests;
