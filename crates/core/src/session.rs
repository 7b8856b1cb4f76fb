// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identifiers and the object names derived from them.
//!
//! Every object a capture session creates in the cluster is tagged with the
//! session id so teardown is unambiguous.

use uuid::Uuid;

/// Generate an opaque, globally unique session identifier.
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Name of the collector pod for a session.
pub fn collector_pod_name(session_id: &str) -> String {
    format!("collector-{session_id}")
}

/// Name of the ephemeral sniffer container injected into each target pod.
pub fn sniffer_container_name(session_id: &str) -> String {
    format!("sniffer-{session_id}")
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
