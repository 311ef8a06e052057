// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys written by the operator
pub mod annotations {
    /// Ownership marker placed on every paired deployment
    pub const GENERATED: &str = "generated";
    pub const GENERATED_VALUE: &str = "hello-operator";
}

/// Kubernetes label keys written by the operator
pub mod labels {
    /// Name of the Emitter a paired deployment belongs to
    pub const EMITTER: &str = "hello-operator.com/emitter";
}

/// Prefix of every paired deployment name
pub const DEPLOYMENT_NAME_PREFIX: &str = "emitter-";

/// Default location of the paired deployment template
pub const DEFAULT_MANIFEST_PATH: &str = "manifests/emitter-deployment.yaml";

/// Default delay before a reported failure is reconciled again
pub const DEFAULT_ERROR_REQUEUE_SECS: u64 = 60;

/// Upper bound for the doubling retry delay of a repeatedly failing Emitter
pub const MAX_ERROR_REQUEUE_SECS: u64 = 600;

/// Finalizer holding an Emitter until its paired deployment is removed
pub const FINALIZER: &str = "hello-operator.com/paired-deployment";

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
