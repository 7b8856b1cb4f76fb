// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kpture-agent: the sniffer sidecar.
//!
//! Captures frames from one interface inside one pod and forwards them to
//! the collector over a bidirectional stream, then exits when the collector
//! says so.

pub mod capture;
pub mod run;

pub use run::run;

use thiserror::Error;

/// Agent-fatal errors. Capture errors are written to the termination-message
/// file by the CLI wrapper so the controller can surface the cause.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("collector target address not set")]
    NoTarget,

    #[error("could not read hostname: {0}")]
    Hostname(#[source] nix::Error),

    #[error("could not open capture source: {0}")]
    OpenDevice(#[source] pcap::Error),

    #[error("could not set capture filter: {0}")]
    Filter(#[source] pcap::Error),

    #[error("could not reach collector: {0}")]
    Connect(#[source] tonic::transport::Error),

    #[error("stream failed: {0}")]
    Stream(#[source] tonic::Status),

    #[error("capture source closed")]
    SourceClosed,
}
