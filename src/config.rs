// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{DEFAULT_ERROR_REQUEUE_SECS, DEFAULT_MANIFEST_PATH};
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Path of the paired deployment template
    pub manifest_path: PathBuf,
    /// Only watch Emitters in this namespace. All namespaces when unset.
    pub watch_namespace: Option<String>,
    /// Return non-NotFound failures to the controller so they are retried.
    /// When false, failures are only logged.
    pub report_failures: bool,
    /// First retry delay after a reported failure, doubled on every further failure
    pub error_requeue: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
            watch_namespace: None,
            report_failures: true,
            error_requeue: Duration::from_secs(DEFAULT_ERROR_REQUEUE_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let manifest_path = lookup("MANIFEST_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.manifest_path);

        let watch_namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty());

        let report_failures = match lookup("REPORT_FAILURES") {
            Some(v) => v
                .parse()
                .with_context(|| format!("REPORT_FAILURES must be true or false, got '{}'", v))?,
            None => defaults.report_failures,
        };

        let error_requeue = match lookup("ERROR_REQUEUE_SECS") {
            Some(v) => {
                let secs: u64 = v
                    .parse()
                    .with_context(|| format!("ERROR_REQUEUE_SECS must be a number, got '{}'", v))?;
                if secs == 0 {
                    bail!("ERROR_REQUEUE_SECS must be at least 1");
                }
                Duration::from_secs(secs)
            }
            None => defaults.error_requeue,
        };

        Ok(Config {
            manifest_path,
            watch_namespace,
            report_failures,
            error_requeue,
        })
    }
}
