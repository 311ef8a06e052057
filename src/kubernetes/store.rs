// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed reads and writes of Emitters and their paired deployments.

use crate::constants::labels;
use crate::error::Result;
use crate::manifest::is_generated;
use crate::types::{Emitter, EmitterKey};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use kube::{
    api::{DeleteParams, ListParams, PostParams},
    Api, Client, ResourceExt,
};
use tracing::{debug, instrument};

/// The cluster operations the reconciler depends on.
/// Lookups of absent objects fail with an error whose kind is `NotFound`.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn get_emitter(&self, key: &EmitterKey) -> Result<Emitter>;

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment>;

    async fn create_deployment(&self, deployment: &Deployment) -> Result<()>;

    async fn delete_deployment(&self, deployment: &Deployment) -> Result<()>;

    /// Generated deployments labelled as belonging to the given Emitter
    async fn find_owned_deployments(&self, key: &EmitterKey) -> Result<Vec<Deployment>>;

    /// Every generated deployment carrying an Emitter label, in one namespace or all of them
    async fn list_owned_deployments(&self, namespace: Option<&str>) -> Result<Vec<Deployment>>;
}

/// `ResourceStore` backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn deployments(&self, namespace: &str) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ResourceStore for KubeStore {
    #[instrument(skip(self), fields(emitter = %key))]
    async fn get_emitter(&self, key: &EmitterKey) -> Result<Emitter> {
        let emitters: Api<Emitter> = Api::namespaced(self.client.clone(), &key.namespace);
        Ok(emitters.get(&key.name).await?)
    }

    #[instrument(skip(self))]
    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment> {
        Ok(self.deployments(namespace).get(name).await?)
    }

    async fn create_deployment(&self, deployment: &Deployment) -> Result<()> {
        let namespace = deployment.namespace().unwrap_or_default();
        debug!("Creating deployment {}/{}", namespace, deployment.name_any());
        self.deployments(&namespace)
            .create(&PostParams::default(), deployment)
            .await?;
        Ok(())
    }

    async fn delete_deployment(&self, deployment: &Deployment) -> Result<()> {
        let namespace = deployment.namespace().unwrap_or_default();
        debug!("Deleting deployment {}/{}", namespace, deployment.name_any());
        self.deployments(&namespace)
            .delete(&deployment.name_any(), &DeleteParams::default())
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(emitter = %key))]
    async fn find_owned_deployments(&self, key: &EmitterKey) -> Result<Vec<Deployment>> {
        let lp = ListParams::default().labels(&format!("{}={}", labels::EMITTER, key.name));
        let deployments = self.deployments(&key.namespace).list(&lp).await?;

        Ok(deployments.items.into_iter().filter(is_generated).collect())
    }

    #[instrument(skip(self))]
    async fn list_owned_deployments(&self, namespace: Option<&str>) -> Result<Vec<Deployment>> {
        let deployments: Api<Deployment> = match namespace {
            Some(ns) => self.deployments(ns),
            None => Api::all(self.client.clone()),
        };
        let lp = ListParams::default().labels(labels::EMITTER);

        Ok(deployments
            .list(&lp)
            .await?
            .items
            .into_iter()
            .filter(is_generated)
            .collect())
    }
}
