// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes access: CRD discovery and the typed resource store.

pub mod crd;
pub mod store;

pub use crd::wait_for_emitter_crd;
pub use store::{KubeStore, ResourceStore};
