// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::DEPLOYMENT_NAME_PREFIX;
use crate::types::key::EmitterKey;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(
    group = "webapp.hello.operator.com",
    version = "v1",
    kind = "Emitter",
    plural = "emitters"
)]
#[kube(namespaced)]
#[kube(status = "EmitterStatus")]
#[serde(rename_all = "camelCase")]
pub struct EmitterSpec {
    /// Reserved. Not consulted when reconciling.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub create_pair: bool,
    /// Suffix of the paired deployment name. Empty means no pairing is requested.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pair_name: String,
}

/// Observed state of an Emitter. Nothing is written back by the operator.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct EmitterStatus {}

impl Emitter {
    pub fn key(&self) -> EmitterKey {
        EmitterKey::from_resource(self)
    }

    pub fn pair_name(&self) -> &str {
        &self.spec.pair_name
    }

    /// Whether a paired deployment is requested at all
    pub fn wants_pair(&self) -> bool {
        !self.spec.pair_name.is_empty()
    }

    /// Name of the paired deployment, derived from the pair name even when it is empty
    pub fn deployment_name(&self) -> String {
        format!("{}{}", DEPLOYMENT_NAME_PREFIX, self.spec.pair_name)
    }
}
