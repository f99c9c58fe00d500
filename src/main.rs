// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context as _, Result};
use axum::{http::StatusCode, routing::get, Router};
use clap::Parser;
use futures::StreamExt;
use infrastructure_manager::{
    config::Config,
    constants::{
        ERROR_REQUEUE_DURATION_SECS, KIND_GARDENER_CLUSTER, KIND_RUNTIME, METRICS_SERVER_BIND_ADDRESS, METRICS_SERVER_PATH,
        METRICS_SERVER_PORT, TOKIO_WORKER_THREADS,
    },
    context::{Context, RotationSettings, Settings},
    crd::{GardenerCluster, Runtime},
    duration::parse_duration,
    gardener::kubeconfig::{client_from_kubeconfig_file, GardenerKubeconfigProvider},
    metrics,
    reconcilers::{reconcile_gardener_cluster, reconcile_runtime},
};
use kube::{
    runtime::{controller::Action, watcher::Config as WatcherConfig, Controller},
    Api, Client, ResourceExt,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

/// Provisions Gardener shoots for Runtime resources and keeps their kubeconfigs fresh
#[derive(Parser, Debug)]
#[command(name = "infrastructure-manager", version, about, long_about = None)]
struct Args {
    /// Converter configuration file (JSON)
    #[arg(
        long,
        env = "CONVERTER_CONFIG_FILEPATH",
        default_value = "/converter-config/converter_config.json"
    )]
    converter_config_filepath: PathBuf,

    /// Kubeconfig of the Gardener project cluster
    #[arg(
        long,
        env = "GARDENER_KUBECONFIG_PATH",
        default_value = "/gardener/kubeconfig/kubeconfig"
    )]
    gardener_kubeconfig_path: PathBuf,

    /// Overrides `converter.gardener.projectName` from the configuration file
    #[arg(long, env = "GARDENER_PROJECT_NAME")]
    gardener_project_name: Option<String>,

    /// Intended lifetime of issued kubeconfigs
    #[arg(long, env = "KUBECONFIG_ROTATION_PERIOD", default_value = "24h", value_parser = parse_duration)]
    kubeconfig_rotation_period: Duration,

    /// Fraction of the rotation period after which a kubeconfig is rotated
    #[arg(long, env = "KUBECONFIG_ROTATION_RATIO", default_value_t = 0.95)]
    kubeconfig_rotation_ratio: f64,

    /// Deadline for a single reconciliation
    #[arg(long, env = "GARDENER_REQUEST_TIMEOUT", default_value = "60s", value_parser = parse_duration)]
    gardener_request_timeout: Duration,

    /// Shortest requeue scheduled while waiting for a rotation
    #[arg(long, env = "MINIMAL_ROTATION_TIME", default_value = "1s", value_parser = parse_duration)]
    minimal_rotation_time: Duration,

    /// Directory receiving shoot and runtime dumps; dumping is off when unset
    #[arg(long, env = "PERSIST_SHOOT_PATH")]
    persist_shoot_path: Option<PathBuf>,

    /// Block Runtime readiness on audit log configuration failures
    #[arg(
        long,
        env = "AUDIT_LOG_MANDATORY",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    audit_log_mandatory: bool,

    /// Address serving metrics and health probes
    #[arg(long, env = "METRICS_BIND_ADDRESS", default_value_t = default_metrics_address())]
    metrics_bind_address: String,
}

impl Args {
    fn settings(&self) -> Result<Settings> {
        Ok(Settings {
            rotation: RotationSettings::new(
                self.kubeconfig_rotation_period,
                self.kubeconfig_rotation_ratio,
                self.minimal_rotation_time,
            )?,
            gardener_request_timeout: self.gardener_request_timeout,
            persist_shoot_path: self.persist_shoot_path.clone(),
            audit_log_mandatory: self.audit_log_mandatory,
        })
    }
}

fn default_metrics_address() -> String {
    format!("{METRICS_SERVER_BIND_ADDRESS}:{METRICS_SERVER_PORT}")
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("infrastructure-manager")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    // Respects RUST_LOG (default info) and RUST_LOG_FORMAT (json or text)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting Infrastructure Manager");
    debug!(?args, "Parsed command line");

    let settings = args.settings()?;

    let mut config = Config::load(&args.converter_config_filepath)?;
    if let Some(project) = &args.gardener_project_name {
        config.converter.gardener.project_name.clone_from(project);
    }
    info!(
        project = %config.converter.gardener.project_name,
        "Loaded converter configuration"
    );

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;

    debug!(path = %args.gardener_kubeconfig_path.display(), "Initializing Gardener client");
    let gardener_client = client_from_kubeconfig_file(&args.gardener_kubeconfig_path)
        .await
        .context("Failed to build Gardener client")?;

    let provider = Arc::new(GardenerKubeconfigProvider::new(
        gardener_client.clone(),
        &config.converter.project_namespace(),
    ));
    let ctx = Arc::new(Context::new(
        client,
        gardener_client,
        provider,
        config,
        settings,
    ));

    let metrics_address: SocketAddr = args
        .metrics_bind_address
        .parse()
        .with_context(|| format!("Invalid metrics bind address {}", args.metrics_bind_address))?;

    info!("Starting all controllers");

    // Controllers should never exit - if one does, log it and exit the main process
    tokio::select! {
        result = run_runtime_controller(ctx.clone()) => {
            error!("CRITICAL: Runtime controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Runtime controller exited unexpectedly without error")
        }
        result = run_gardener_cluster_controller(ctx.clone()) => {
            error!("CRITICAL: GardenerCluster controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("GardenerCluster controller exited unexpectedly without error")
        }
        result = run_metrics_server(metrics_address) => {
            error!("CRITICAL: Metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Metrics server exited unexpectedly without error")
        }
        result = shutdown_signal() => {
            result?;
            info!("Shutdown signal received, stopping controllers");
            Ok(())
        }
    }
}

/// Resolves on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}

/// Serves `/metrics`, `/healthz` and `/readyz`
async fn run_metrics_server(address: SocketAddr) -> Result<()> {
    info!(%address, "Starting metrics server");

    let app = Router::new()
        .route(METRICS_SERVER_PATH, get(metrics_handler))
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(|| async { "ok" }));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind metrics server to {address}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn metrics_handler() -> Result<String, (StatusCode, String)> {
    metrics::gather_metrics().map_err(|e| {
        error!(error = %e, "Failed to encode metrics");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

/// Run the `Runtime` controller
async fn run_runtime_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting Runtime controller");

    let api = Api::<Runtime>::all(ctx.client.clone());

    Controller::new(api, WatcherConfig::default())
        .run(reconcile_runtime_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `Runtime`
async fn reconcile_runtime_wrapper(
    runtime: Arc<Runtime>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    debug!(
        runtime = %runtime.name_any(),
        namespace = ?runtime.namespace(),
        "Reconcile wrapper called for Runtime"
    );

    let start = Instant::now();
    match reconcile_runtime(runtime.clone(), ctx).await {
        Ok(action) => {
            metrics::record_reconciliation_success(KIND_RUNTIME, start.elapsed());
            debug!("Successfully reconciled Runtime: {}", runtime.name_any());
            Ok(action)
        }
        Err(e) => {
            metrics::record_reconciliation_error(KIND_RUNTIME, start.elapsed());
            error!("Failed to reconcile Runtime {}: {:#}", runtime.name_any(), e);
            Err(e.into())
        }
    }
}

/// Run the `GardenerCluster` controller
async fn run_gardener_cluster_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting GardenerCluster controller");

    let api = Api::<GardenerCluster>::all(ctx.client.clone());

    Controller::new(api, WatcherConfig::default())
        .run(reconcile_gardener_cluster_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `GardenerCluster`
async fn reconcile_gardener_cluster_wrapper(
    cluster: Arc<GardenerCluster>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = Instant::now();
    match reconcile_gardener_cluster(cluster.clone(), ctx).await {
        Ok(action) => {
            metrics::record_reconciliation_success(KIND_GARDENER_CLUSTER, start.elapsed());
            debug!("Successfully reconciled GardenerCluster: {}", cluster.name_any());
            Ok(action)
        }
        Err(e) => {
            metrics::record_reconciliation_error(KIND_GARDENER_CLUSTER, start.elapsed());
            error!(
                "Failed to reconcile GardenerCluster {}: {:#}",
                cluster.name_any(),
                e
            );
            Err(e.into())
        }
    }
}

/// Error policy shared by both controllers
fn error_policy(
    _resource: Arc<impl std::fmt::Debug>,
    err: &ReconcileError,
    _ctx: Arc<Context>,
) -> Action {
    warn!(error = %err, "Reconciliation failed, requeueing");
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod main_tests;
