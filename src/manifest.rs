// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Loading and rendering of the paired deployment template.

use crate::constants::{annotations, labels};
use crate::error::{OperatorError, Result};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

const DEPLOYMENT_API_VERSION: &str = "apps/v1";
const DEPLOYMENT_KIND: &str = "Deployment";
const MAX_LABEL_VALUE_LEN: usize = 63;

/// Source of the raw deployment template
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn load(&self) -> Result<Vec<u8>>;
}

/// Template read from disk on every load, so edits are picked up without a restart
#[derive(Debug, Clone)]
pub struct FileManifest {
    path: PathBuf,
}

impl FileManifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ManifestSource for FileManifest {
    async fn load(&self) -> Result<Vec<u8>> {
        debug!("Reading manifest {}", self.path.display());
        tokio::fs::read(&self.path)
            .await
            .map_err(|source| OperatorError::ManifestRead {
                path: self.path.display().to_string(),
                source,
            })
    }
}

/// Decode a YAML (or JSON) document into a Deployment.
/// The document must declare `apiVersion: apps/v1` and `kind: Deployment`.
pub fn decode_deployment(bytes: &[u8]) -> Result<Deployment> {
    let value: serde_yaml::Value = serde_yaml::from_slice(bytes)?;

    let api_version = value.get("apiVersion").and_then(|v| v.as_str());
    let kind = value.get("kind").and_then(|v| v.as_str());

    if api_version != Some(DEPLOYMENT_API_VERSION) || kind != Some(DEPLOYMENT_KIND) {
        return Err(OperatorError::ManifestKind(format!(
            "{}/{}",
            api_version.unwrap_or("<missing apiVersion>"),
            kind.unwrap_or("<missing kind>")
        )));
    }

    Ok(serde_yaml::from_value(value)?)
}

/// Turn the decoded template into the paired deployment of one Emitter.
/// Namespace and name are overwritten, the annotations are replaced by the ownership marker.
pub fn render_paired_deployment(
    mut template: Deployment,
    namespace: &str,
    name: &str,
    emitter_name: &str,
) -> Deployment {
    let metadata = &mut template.metadata;
    metadata.namespace = Some(namespace.to_string());
    metadata.name = Some(name.to_string());
    metadata.annotations = Some(BTreeMap::from([(
        annotations::GENERATED.to_string(),
        annotations::GENERATED_VALUE.to_string(),
    )]));

    // Names longer than a label value allows can only be found through the tracker
    if emitter_name.len() <= MAX_LABEL_VALUE_LEN {
        metadata
            .labels
            .get_or_insert_with(BTreeMap::new)
            .insert(labels::EMITTER.to_string(), emitter_name.to_string());
    }

    template
}

/// Whether a deployment carries the ownership marker
pub fn is_generated(deployment: &Deployment) -> bool {
    deployment
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(annotations::GENERATED))
        .is_some_and(|v| v == annotations::GENERATED_VALUE)
}
