// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::EmitterKey;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Last deployment name derived for each Emitter seen by this process.
/// Used to find the paired deployment once the Emitter itself is gone.
/// Starts empty on every restart.
#[derive(Debug, Clone, Default)]
pub struct DeploymentTracker {
    entries: Arc<RwLock<HashMap<EmitterKey, String>>>,
}

impl DeploymentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, key: &EmitterKey, deployment_name: &str) {
        self.entries
            .write()
            .await
            .insert(key.clone(), deployment_name.to_string());
    }

    pub async fn get(&self, key: &EmitterKey) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn forget(&self, key: &EmitterKey) -> Option<String> {
        self.entries.write().await.remove(key)
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
