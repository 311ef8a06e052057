// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use emitter_operator::types::Emitter;
use kube::CustomResourceExt;

/// Print the Emitter CRD so it can be piped into `kubectl apply -f -`
fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&Emitter::crd())?);
    Ok(())
}
