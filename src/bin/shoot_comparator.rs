// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shoot comparator
//!
//! Compares the shoot YAML files of two directories, for example dumps written
//! by two controller versions via `--persist-shoot-path`, and writes a
//! `<shoot>.diff` per differing shoot plus `report.yaml`.
//!
//! Usage:
//!   cargo run --bin shoot-comparator -- --left-dir a/ --right-dir b/ --output-dir out/
//!
//! Exits with status 1 when the directories differ.

use anyhow::{Context, Result};
use clap::Parser;
use infrastructure_manager::comparator::directory::{compare_directories, write_report};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

/// Compare Gardener shoot specs stored in two directories
#[derive(Parser, Debug)]
#[command(name = "shoot-comparator", version, about, long_about = None)]
struct Args {
    /// Directory with the reference shoots
    #[arg(long, env = "LEFT_DIR")]
    left_dir: PathBuf,

    /// Directory with the shoots to check
    #[arg(long, env = "RIGHT_DIR")]
    right_dir: PathBuf,

    /// Directory receiving the diffs and report.yaml
    #[arg(long, env = "OUTPUT_DIR")]
    output_dir: PathBuf,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();

    let report = compare_directories(&args.left_dir, &args.right_dir).with_context(|| {
        format!(
            "Failed to compare {} with {}",
            args.left_dir.display(),
            args.right_dir.display()
        )
    })?;
    let report_path = write_report(&report, &args.output_dir)?;

    for file in &report.only_left {
        warn!(file = %file, "Shoot present only in left directory");
    }
    for file in &report.only_right {
        warn!(file = %file, "Shoot present only in right directory");
    }

    if report.is_equal() {
        info!(compared = report.compared, "No differences found");
        return Ok(ExitCode::SUCCESS);
    }

    info!(
        differences = report.differences.len(),
        report = %report_path.display(),
        "Differences found"
    );
    Ok(ExitCode::FAILURE)
}
