// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource types and identities.

pub mod emitter;
pub mod key;

pub use emitter::{Emitter, EmitterSpec, EmitterStatus};
pub use key::EmitterKey;
