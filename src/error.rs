// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OperatorError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to read manifest {path}: {source}")]
    ManifestRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode manifest: {0}")]
    ManifestDecode(#[from] serde_yaml::Error),

    #[error("Manifest is not an apps/v1 Deployment: found {0}")]
    ManifestKind(String),

    #[error("{resource} \"{name}\" not found")]
    NotFound { resource: &'static str, name: String },

    #[error("Resource store error: {0}")]
    Store(String),

    #[error("Finalizer error: {0}")]
    Finalizer(String),
}

/// Coarse classification used to decide whether a failure is reported or suppressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The resource is absent; an expected steady-state condition
    NotFound,
    /// API or transport failure, retried by the controller
    Transient,
    /// The deployment template could not be read
    Manifest,
    /// The deployment template could not be decoded
    Decode,
}

impl OperatorError {
    /// Inspect the error without assuming its shape. Anything unrecognised is transient.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OperatorError::NotFound { .. } => ErrorKind::NotFound,
            OperatorError::KubeError(kube::Error::Api(resp)) if resp.code == 404 => {
                ErrorKind::NotFound
            }
            OperatorError::KubeError(_) | OperatorError::Store(_) | OperatorError::Finalizer(_) => {
                ErrorKind::Transient
            }
            OperatorError::ManifestRead { .. } => ErrorKind::Manifest,
            OperatorError::ManifestDecode(_) | OperatorError::ManifestKind(_) => {
                ErrorKind::Decode
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

pub type Result<T> = std::result::Result<T, OperatorError>;
