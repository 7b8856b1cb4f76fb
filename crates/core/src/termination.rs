// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kubernetes termination-message support.
//!
//! Sidecar containers report their fatal error by appending it to the
//! termination-message file (default `/dev/termination-log`), where the
//! controller's watcher can read it back out of the pod status after the
//! container has already exited.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Conventional kubelet termination-message path.
pub const DEFAULT_MESSAGE_PATH: &str = "/dev/termination-log";

/// Appends fatal error text to the termination-message file.
///
/// When disabled (no path), [`TerminationWriter::record`] is a no-op so the
/// same code path works outside a pod.
pub struct TerminationWriter {
    file: Option<File>,
}

impl TerminationWriter {
    /// Open the termination-message file for appending. Pass `None` to
    /// disable (e.g. when running outside a pod).
    pub fn open(path: Option<&Path>) -> std::io::Result<Self> {
        let file = match path {
            Some(p) => Some(OpenOptions::new().create(true).append(true).open(p)?),
            None => None,
        };
        Ok(Self { file })
    }

    /// Record a fatal error. Write failures are reported so the caller can
    /// still surface the original error.
    pub fn record(&mut self, error: &dyn std::fmt::Display) -> std::io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            write!(file, "{error}")?;
            file.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "termination_tests.rs"]
mod termination_tests;
