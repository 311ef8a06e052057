// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::{Resource, ResourceExt};
use std::fmt;

/// Identity of an Emitter: the scope of a single reconcile invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitterKey {
    pub namespace: String,
    pub name: String,
}

impl EmitterKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Build the key for any namespaced object. Cluster-scoped objects get an empty namespace.
    pub fn from_resource<K: Resource>(obj: &K) -> Self {
        Self::new(obj.namespace().unwrap_or_default(), obj.name_any())
    }
}

impl fmt::Display for EmitterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::apps::v1::Deployment;
    use kube::api::ObjectMeta;

    #[test]
    fn test_display_is_namespace_slash_name() {
        assert_eq!(EmitterKey::new("default", "e1").to_string(), "default/e1");
    }

    #[test]
    fn test_from_resource() {
        let deployment = Deployment {
            metadata: ObjectMeta {
                name: Some("emitter-foo".to_string()),
                namespace: Some("team-a".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        assert_eq!(
            EmitterKey::from_resource(&deployment),
            EmitterKey::new("team-a", "emitter-foo")
        );
    }
}
