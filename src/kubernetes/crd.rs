// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Startup gate on the Emitter CRD being installed and established.

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use crate::types::Emitter;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{Api, Client, CustomResourceExt};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Block until the API server reports the Emitter CRD as `Established`.
/// Polls every POLL_INTERVAL_SECS seconds, doubling up to POLL_MAX_INTERVAL_SECS.
pub async fn wait_for_emitter_crd(client: &Client) -> Result<()> {
    let crds: Api<CustomResourceDefinition> = Api::all(client.clone());
    let name = Emitter::crd_name();
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match emitter_crd_established(&crds, name).await {
            Ok(true) => {
                info!("CRD {} is established", name);
                return Ok(());
            }
            Ok(false) => info!("CRD {} not established yet, next check in {}s", name, interval),
            Err(e) => warn!("Looking up CRD {} failed: {}, next check in {}s", name, e, interval),
        }

        sleep(Duration::from_secs(interval)).await;
        interval = next_interval(interval);
    }
}

fn next_interval(interval: u64) -> u64 {
    interval.saturating_mul(2).min(POLL_MAX_INTERVAL_SECS)
}

async fn emitter_crd_established(crds: &Api<CustomResourceDefinition>, name: &str) -> Result<bool> {
    let crd = crds.get_opt(name).await?;
    Ok(crd.as_ref().is_some_and(is_established))
}

fn is_established(crd: &CustomResourceDefinition) -> bool {
    crd.status
        .as_ref()
        .and_then(|status| status.conditions.as_ref())
        .is_some_and(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Established" && c.status == "True")
        })
}
