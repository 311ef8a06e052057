// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use emitter_operator::config::Config;
use emitter_operator::kubernetes::{wait_for_emitter_crd, KubeStore};
use emitter_operator::manifest::FileManifest;
use emitter_operator::reconcilers::{DeploymentTracker, EmitterController, EmitterReconciler};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Emitter operator");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: manifest_path={}, watch_namespace={:?}, report_failures={}",
        config.manifest_path.display(),
        config.watch_namespace,
        config.report_failures
    );

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    info!("Connected to Kubernetes cluster");

    info!("Waiting for Emitter CRD to become available...");
    wait_for_emitter_crd(&client).await?;

    let reconciler = EmitterReconciler::new(
        KubeStore::new(client.clone()),
        FileManifest::new(&config.manifest_path),
        DeploymentTracker::new(),
    )
    .with_report_failures(config.report_failures);

    let controller = EmitterController::new(
        client,
        config.watch_namespace.clone(),
        Arc::new(reconciler),
        config.error_requeue,
    );

    controller.run().await?;

    // The controller stream only ends when the operator is shutting down
    warn!("Emitter controller stopped unexpectedly");
    Ok(())
}
