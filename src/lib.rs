// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Infrastructure Manager - Kyma runtime provisioning on Gardener
//!
//! The infrastructure manager turns `Runtime` resources into Gardener shoots and
//! keeps a rotated admin kubeconfig for every cluster in a Secret.
//!
//! ## Modules
//!
//! - [`crd`] - `Runtime` and `GardenerCluster` custom resources
//! - [`gardener`] - Gardener API types and admin kubeconfig retrieval
//! - [`hyperscaler`] - per-provider infrastructure, control plane and worker configs
//! - [`converter`] - Runtime to Shoot conversion through an ordered extender chain
//! - [`comparator`] - structural comparison of shoots, used by `shoot-comparator`
//! - [`reconcilers`] - the Runtime state machine and the kubeconfig controller
//! - [`context`] - shared clients, configuration and settings
//!
//! ## Example
//!
//! ```rust,no_run
//! use infrastructure_manager::config::Config;
//! use infrastructure_manager::converter::Converter;
//! use infrastructure_manager::crd::Runtime;
//!
//! # fn example(runtime: &Runtime) -> anyhow::Result<()> {
//! let config = Config::load(std::path::Path::new("/config/converter_config.json"))?;
//! let shoot = Converter::new(config.converter).to_shoot(runtime)?;
//! println!("{}", serde_yaml::to_string(&shoot)?);
//! # Ok(())
//! # }
//! ```

pub mod comparator;
pub mod config;
pub mod constants;
pub mod context;
pub mod converter;
pub mod crd;
pub mod duration;
pub mod errors;
pub mod gardener;
pub mod hyperscaler;
pub mod labels;
pub mod metrics;
pub mod reconcilers;
pub mod status_reasons;

#[cfg(test)]
pub(crate) mod test_support;
