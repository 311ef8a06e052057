// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Emitter reconciliation and the controller that drives it.

pub mod controller;
pub mod emitter;
pub mod tracker;

pub use controller::EmitterController;
pub use emitter::{EmitterReconciler, Reconcile, ReconcileOutcome};
pub use tracker::DeploymentTracker;
