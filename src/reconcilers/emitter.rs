// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Emitter reconciler - keeps the paired deployment in step with its Emitter.

use crate::constants::labels;
use crate::error::{ErrorKind, OperatorError, Result};
use crate::kubernetes::ResourceStore;
use crate::manifest::{decode_deployment, render_paired_deployment, ManifestSource};
use crate::reconcilers::tracker::DeploymentTracker;
use crate::types::{Emitter, EmitterKey};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use kube::ResourceExt;
use std::collections::BTreeSet;
use tracing::{debug, error, info, instrument};

/// What a single reconcile invocation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The Emitter has an empty pair name
    NoPairRequested,
    /// The paired deployment already exists
    AlreadyPaired { deployment: String },
    Created { deployment: String },
    /// The Emitter is gone and its deployments were removed
    Deleted { deployments: Vec<String> },
    /// The Emitter is gone and nothing owned by it was found
    NothingToCleanUp,
    /// A failure was logged but not reported
    Suppressed { kind: ErrorKind },
}

/// A reconciler the controller can drive by identity
#[async_trait]
pub trait Reconcile: Send + Sync + 'static {
    async fn reconcile(&self, key: &EmitterKey) -> Result<ReconcileOutcome>;

    /// Remove what the Emitter left behind. Called once the Emitter is being deleted.
    async fn clean_up(&self, key: &EmitterKey) -> Result<ReconcileOutcome>;

    /// Emitters that own deployments in the cluster, used to sweep for orphans at startup
    async fn owner_keys(&self, namespace: Option<&str>) -> Result<Vec<EmitterKey>>;
}

pub struct EmitterReconciler<S, M> {
    store: S,
    manifest: M,
    tracker: DeploymentTracker,
    report_failures: bool,
}

impl<S: ResourceStore, M: ManifestSource> EmitterReconciler<S, M> {
    pub fn new(store: S, manifest: M, tracker: DeploymentTracker) -> Self {
        Self {
            store,
            manifest,
            tracker,
            report_failures: true,
        }
    }

    /// When disabled, failures other than NotFound are logged and the invocation still succeeds
    pub fn with_report_failures(mut self, report_failures: bool) -> Self {
        self.report_failures = report_failures;
        self
    }

    #[cfg(test)]
    pub(crate) fn tracker(&self) -> &DeploymentTracker {
        &self.tracker
    }

    async fn reconcile_emitter(&self, key: &EmitterKey, emitter: &Emitter) -> Result<ReconcileOutcome> {
        let deployment_name = emitter.deployment_name();
        self.tracker.record(key, &deployment_name).await;

        if !emitter.wants_pair() {
            info!("No pair name set on emitter, skipping");
            return Ok(ReconcileOutcome::NoPairRequested);
        }

        match self.store.get_deployment(&key.namespace, &deployment_name).await {
            Ok(_) => {
                debug!("Deployment {} already exists", deployment_name);
                Ok(ReconcileOutcome::AlreadyPaired {
                    deployment: deployment_name,
                })
            }
            Err(e) if e.is_not_found() => {
                info!("Deployment {} not found, creating it", deployment_name);
                match self.create_paired_deployment(key, &deployment_name).await {
                    Ok(()) => {
                        info!("Created deployment {}/{}", key.namespace, deployment_name);
                        Ok(ReconcileOutcome::Created {
                            deployment: deployment_name,
                        })
                    }
                    Err(e) => {
                        error!("Unable to create deployment {}: {}", deployment_name, e);
                        self.settle(e)
                    }
                }
            }
            Err(e) => {
                error!("Failed to get deployment {}: {}", deployment_name, e);
                self.settle(e)
            }
        }
    }

    async fn create_paired_deployment(&self, key: &EmitterKey, deployment_name: &str) -> Result<()> {
        let bytes = self.manifest.load().await?;
        let template = decode_deployment(&bytes)?;
        let deployment = render_paired_deployment(template, &key.namespace, deployment_name, &key.name);
        self.store.create_deployment(&deployment).await
    }

    async fn remove_dangling(&self, key: &EmitterKey) -> Result<ReconcileOutcome> {
        info!("Emitter is gone, checking for dangling deployments");

        let mut targets: Vec<Deployment> = Vec::new();

        if let Some(name) = self.tracker.get(key).await {
            match self.store.get_deployment(&key.namespace, &name).await {
                Ok(deployment) => targets.push(deployment),
                Err(e) if e.is_not_found() => debug!("Tracked deployment {} is already gone", name),
                Err(e) => {
                    error!("Failed to get tracked deployment {}: {}", name, e);
                    return self.settle(e);
                }
            }
        }

        let owned = match self.store.find_owned_deployments(key).await {
            Ok(owned) => owned,
            Err(e) => {
                error!("Failed to list deployments owned by the emitter: {}", e);
                return self.settle(e);
            }
        };
        let mut seen: BTreeSet<String> = targets.iter().map(|d| d.name_any()).collect();
        targets.extend(owned.into_iter().filter(|d| seen.insert(d.name_any())));

        if targets.is_empty() {
            self.tracker.forget(key).await;
            debug!("Nothing to clean up");
            return Ok(ReconcileOutcome::NothingToCleanUp);
        }

        let mut deleted = Vec::with_capacity(targets.len());
        for deployment in &targets {
            let name = deployment.name_any();
            info!("Deleting dangling deployment {}/{}", key.namespace, name);
            match self.store.delete_deployment(deployment).await {
                Ok(()) => deleted.push(name),
                Err(e) if e.is_not_found() => debug!("Deployment {} disappeared before delete", name),
                Err(e) => {
                    error!("Failed to delete deployment {}: {}", name, e);
                    return self.settle(e);
                }
            }
        }

        self.tracker.forget(key).await;
        Ok(ReconcileOutcome::Deleted {
            deployments: deleted,
        })
    }

    /// NotFound never leaves the reconciler. Other failures are reported only when configured to.
    fn settle(&self, err: OperatorError) -> Result<ReconcileOutcome> {
        let kind = err.kind();
        if kind == ErrorKind::NotFound || !self.report_failures {
            Ok(ReconcileOutcome::Suppressed { kind })
        } else {
            Err(err)
        }
    }
}

#[async_trait]
impl<S, M> Reconcile for EmitterReconciler<S, M>
where
    S: ResourceStore + 'static,
    M: ManifestSource + 'static,
{
    #[instrument(skip(self), fields(emitter = %key))]
    async fn reconcile(&self, key: &EmitterKey) -> Result<ReconcileOutcome> {
        debug!("Reconciling emitter");

        match self.store.get_emitter(key).await {
            Ok(emitter) => self.reconcile_emitter(key, &emitter).await,
            Err(e) if e.is_not_found() => self.remove_dangling(key).await,
            Err(e) => {
                error!("Unable to fetch emitter: {}", e);
                self.settle(e)
            }
        }
    }

    #[instrument(skip(self), fields(emitter = %key))]
    async fn clean_up(&self, key: &EmitterKey) -> Result<ReconcileOutcome> {
        self.remove_dangling(key).await
    }

    async fn owner_keys(&self, namespace: Option<&str>) -> Result<Vec<EmitterKey>> {
        let deployments = self.store.list_owned_deployments(namespace).await?;

        let keys: BTreeSet<EmitterKey> = deployments
            .iter()
            .filter_map(|d| {
                let owner = d.labels().get(labels::EMITTER)?;
                Some(EmitterKey::new(d.namespace().unwrap_or_default(), owner.clone()))
            })
            .collect();

        Ok(keys.into_iter().collect())
    }
}
