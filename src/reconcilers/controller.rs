// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Runs the Emitter reconciler under a kube-runtime `Controller`.
//!
//! Every Emitter carries a finalizer, so a deletion is seen as a `Cleanup` event while the
//! object still exists. Paired deployments are watched too: a change to one re-runs its
//! Emitter, and a deployment whose Emitter is gone surfaces as `ObjectNotFound`.

use crate::constants::{labels, FINALIZER, MAX_ERROR_REQUEUE_SECS};
use crate::error::{OperatorError, Result};
use crate::manifest::is_generated;
use crate::reconcilers::emitter::Reconcile;
use crate::types::{Emitter, EmitterKey};
use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use kube::runtime::controller::{self, Action, Controller};
use kube::runtime::finalizer::{self, finalizer, Event as FinalizerEvent};
use kube::runtime::reflector::ObjectRef;
use kube::{Api, Client, ResourceExt};
use kube_runtime::watcher::Config as WatcherConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Doubling retry delay per Emitter, reset by the next successful reconcile
pub struct RetryBackoff {
    base: Duration,
    max: Duration,
    failures: Mutex<HashMap<EmitterKey, u32>>,
}

impl RetryBackoff {
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            max: base.max(Duration::from_secs(MAX_ERROR_REQUEUE_SECS)),
            failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn next_delay(&self, key: &EmitterKey) -> Duration {
        let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        let count = failures.entry(key.clone()).or_insert(0);
        let delay = self.base.saturating_mul(1 << (*count).min(16)).min(self.max);
        *count = count.saturating_add(1);
        delay
    }

    pub fn reset(&self, key: &EmitterKey) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

pub struct Context<R> {
    client: Client,
    reconciler: Arc<R>,
    retries: RetryBackoff,
}

impl<R: Reconcile> Context<R> {
    pub fn new(client: Client, reconciler: Arc<R>, error_requeue: Duration) -> Self {
        Self {
            client,
            reconciler,
            retries: RetryBackoff::new(error_requeue),
        }
    }
}

pub struct EmitterController<R> {
    client: Client,
    namespace: Option<String>,
    reconciler: Arc<R>,
    error_requeue: Duration,
}

impl<R: Reconcile> EmitterController<R> {
    pub fn new(
        client: Client,
        namespace: Option<String>,
        reconciler: Arc<R>,
        error_requeue: Duration,
    ) -> Self {
        Self {
            client,
            namespace,
            reconciler,
            error_requeue,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let (emitters, deployments): (Api<Emitter>, Api<Deployment>) = match &self.namespace {
            Some(ns) => (
                Api::namespaced(self.client.clone(), ns),
                Api::namespaced(self.client.clone(), ns),
            ),
            None => (Api::all(self.client.clone()), Api::all(self.client.clone())),
        };

        info!(
            "Watching emitters in {}",
            self.namespace.as_deref().unwrap_or("all namespaces")
        );

        // Emitters deleted while the operator was down left no finalizer event behind
        sweep_orphans(&*self.reconciler, self.namespace.as_deref()).await;

        let reconciler = self.reconciler.clone();
        let context = Arc::new(Context::new(
            self.client,
            self.reconciler,
            self.error_requeue,
        ));

        Controller::new(emitters, WatcherConfig::default())
            .watches(
                deployments,
                WatcherConfig::default().labels(labels::EMITTER),
                owning_emitter,
            )
            .run(reconcile::<R>, error_policy::<R>, context)
            .for_each(|res| {
                let reconciler = reconciler.clone();
                async move {
                    match res {
                        Ok((emitter, _)) => debug!("Reconciled emitter {}", emitter),
                        Err(controller::Error::ObjectNotFound(obj)) => {
                            let key = EmitterKey::new(obj.namespace.unwrap_or_default(), obj.name);
                            reconcile_missing(&*reconciler, &key).await;
                        }
                        Err(e) => warn!("Reconciliation error: {:?}", e),
                    }
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile<R: Reconcile>(emitter: Arc<Emitter>, ctx: Arc<Context<R>>) -> Result<Action> {
    let key = emitter.key();
    let emitters: Api<Emitter> = Api::namespaced(ctx.client.clone(), &key.namespace);

    let action = finalizer(&emitters, FINALIZER, emitter, |event| {
        handle_event(&*ctx.reconciler, event)
    })
    .await
    .map_err(from_finalizer_error)?;

    ctx.retries.reset(&key);
    Ok(action)
}

async fn handle_event<R: Reconcile>(reconciler: &R, event: FinalizerEvent<Emitter>) -> Result<Action> {
    match event {
        FinalizerEvent::Apply(emitter) => {
            let outcome = reconciler.reconcile(&emitter.key()).await?;
            debug!("Emitter {} applied: {:?}", emitter.key(), outcome);
        }
        FinalizerEvent::Cleanup(emitter) => {
            let outcome = reconciler.clean_up(&emitter.key()).await?;
            info!("Emitter {} deleted: {:?}", emitter.key(), outcome);
        }
    }
    Ok(Action::await_change())
}

fn error_policy<R: Reconcile>(emitter: Arc<Emitter>, error: &OperatorError, ctx: Arc<Context<R>>) -> Action {
    let key = emitter.key();
    let delay = ctx.retries.next_delay(&key);
    error!(
        "Reconciliation of emitter {} failed: {}, retrying in {:?}",
        key, error, delay
    );
    Action::requeue(delay)
}

fn from_finalizer_error(err: finalizer::Error<OperatorError>) -> OperatorError {
    match err {
        finalizer::Error::ApplyFailed(e) | finalizer::Error::CleanupFailed(e) => e,
        finalizer::Error::AddFinalizer(e) | finalizer::Error::RemoveFinalizer(e) => {
            OperatorError::KubeError(e)
        }
        finalizer::Error::UnnamedObject => {
            OperatorError::Finalizer("Emitter has no name".to_string())
        }
        finalizer::Error::InvalidFinalizer => {
            OperatorError::Finalizer(format!("invalid finalizer name {}", FINALIZER))
        }
    }
}

/// The Emitter a generated deployment belongs to, read from its owner label
fn owning_emitter(deployment: Deployment) -> Option<ObjectRef<Emitter>> {
    if !is_generated(&deployment) {
        return None;
    }
    let owner = deployment.labels().get(labels::EMITTER)?;
    let namespace = deployment.namespace()?;
    Some(ObjectRef::new(owner).within(&namespace))
}

/// A deployment points at an Emitter the controller does not know about
async fn reconcile_missing<R: Reconcile>(reconciler: &R, key: &EmitterKey) {
    match reconciler.reconcile(key).await {
        Ok(outcome) => debug!("Reconciled missing emitter {}: {:?}", key, outcome),
        Err(e) => warn!("Reconciliation of missing emitter {} failed: {}", key, e),
    }
}

async fn sweep_orphans<R: Reconcile>(reconciler: &R, namespace: Option<&str>) {
    let keys = match reconciler.owner_keys(namespace).await {
        Ok(keys) => keys,
        Err(e) => {
            error!("Failed to list owned deployments: {}", e);
            return;
        }
    };

    debug!("Checking {} emitters that own deployments", keys.len());
    for key in keys {
        if let Err(e) = reconciler.reconcile(&key).await {
            warn!("Sweep of emitter {} failed: {}", key, e);
        }
    }
}
