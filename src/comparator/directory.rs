// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Directory mode of the shoot comparator.
//!
//! Every YAML file present in both directories must parse as a [`Shoot`]. The
//! raw documents are compared, so fields the typed shoot does not model still
//! count. Files present on one side only are listed in the report.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::{compare_values, Difference};
use crate::errors::ComparatorError;
use crate::gardener::Shoot;

/// File name of the summary written next to the per-shoot diffs.
pub const REPORT_FILE_NAME: &str = "report.yaml";

/// One differing shoot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub shoot_name: String,
    pub left_shoot: String,
    pub right_shoot: String,
    pub message: String,
}

/// Outcome of comparing two directories.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub left_dir: String,
    pub right_dir: String,
    pub compared: usize,
    pub equal: usize,
    pub differences: Vec<ReportEntry>,
    pub only_left: Vec<String>,
    pub only_right: Vec<String>,
}

impl Report {
    #[must_use]
    pub fn is_equal(&self) -> bool {
        self.differences.is_empty() && self.only_left.is_empty() && self.only_right.is_empty()
    }
}

/// Compares every YAML file present in both `left` and `right`.
///
/// # Errors
///
/// Returns an error if a directory cannot be listed or a file is not a shoot.
pub fn compare_directories(left: &Path, right: &Path) -> Result<Report, ComparatorError> {
    let left_files = yaml_files(left)?;
    let right_files = yaml_files(right)?;

    let mut report = Report {
        left_dir: left.display().to_string(),
        right_dir: right.display().to_string(),
        only_left: left_files.difference(&right_files).cloned().collect(),
        only_right: right_files.difference(&left_files).cloned().collect(),
        ..Report::default()
    };

    for file in left_files.intersection(&right_files) {
        let left_path = left.join(file);
        let right_path = right.join(file);
        let expected = read_shoot(&left_path)?;
        let actual = read_shoot(&right_path)?;

        report.compared += 1;
        let comparison = compare_values(&expected, &actual);
        if comparison.equal {
            report.equal += 1;
            continue;
        }

        debug!(file = %file, differences = comparison.differences.len(), "Shoots differ");
        report.differences.push(ReportEntry {
            shoot_name: expected
                .pointer("/metadata/name")
                .and_then(Value::as_str)
                .map_or_else(|| file.trim_end_matches(".yaml").to_string(), str::to_string),
            left_shoot: left_path.display().to_string(),
            right_shoot: right_path.display().to_string(),
            message: render_differences(&comparison.differences),
        });
    }

    info!(
        compared = report.compared,
        equal = report.equal,
        only_left = report.only_left.len(),
        only_right = report.only_right.len(),
        "Directory comparison finished"
    );
    Ok(report)
}

/// Writes `<shoot>.diff` for every differing shoot and [`REPORT_FILE_NAME`].
///
/// # Errors
///
/// Returns an error if the output directory or any file cannot be written.
pub fn write_report(report: &Report, output_dir: &Path) -> Result<PathBuf, ComparatorError> {
    std::fs::create_dir_all(output_dir).map_err(|source| io_error(output_dir, source))?;

    for entry in &report.differences {
        let path = output_dir.join(format!("{}.diff", entry.shoot_name));
        let body = format!(
            "--- {}\n+++ {}\n{}",
            entry.left_shoot, entry.right_shoot, entry.message
        );
        std::fs::write(&path, body).map_err(|source| io_error(&path, source))?;
    }

    let path = output_dir.join(REPORT_FILE_NAME);
    let body = serde_yaml::to_string(report)?;
    std::fs::write(&path, body).map_err(|source| io_error(&path, source))?;
    Ok(path)
}

fn render_differences(differences: &[Difference]) -> String {
    differences
        .iter()
        .map(|d| format!("{}: {}\n", d.path, d.message))
        .collect()
}

fn yaml_files(dir: &Path) -> Result<BTreeSet<String>, ComparatorError> {
    let entries = std::fs::read_dir(dir).map_err(|source| io_error(dir, source))?;

    let mut files = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|source| io_error(dir, source))?;
        let path = entry.path();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        if path.is_file() && is_yaml {
            files.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(files)
}

/// Reads a shoot file as an untyped document after checking it is a [`Shoot`].
fn read_shoot(path: &Path) -> Result<Value, ComparatorError> {
    let content = std::fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    let parse_error = |source| ComparatorError::Parse {
        path: path.to_path_buf(),
        source,
    };
    serde_yaml::from_str::<Shoot>(&content).map_err(parse_error)?;
    serde_yaml::from_str(&content).map_err(parse_error)
}

fn io_error(path: &Path, source: std::io::Error) -> ComparatorError {
    ComparatorError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
#[path = "directory_tests.rs"]
mod directory_tests;
