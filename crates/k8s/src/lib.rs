// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kpture-k8s: cluster-side orchestration for a capture session.
//!
//! The controller talks to the cluster exclusively through the narrow
//! capability traits defined here ([`VersionGetter`], [`PodLister`],
//! [`EphemeralContainerUpdater`], [`PodCrud`], [`Forwarder`]), all
//! implemented for `kube::Api<Pod>` / `kube::Client`. The traits keep the
//! orchestration testable without a live cluster.

pub mod client;
pub mod collector;
pub mod ephemeral;
pub mod forward;
pub mod preflight;

pub use client::{ClientError, Cluster};
pub use collector::{deploy_collector, teardown_collector, PodCrud, ProvisionError};
pub use ephemeral::{inject_agents, watch_agents, EphemeralContainerUpdater};
pub use forward::{start_forward, ForwardError, Forwarder, PortForwarder};
pub use preflight::{
    check_ephemeral_support, ensure_running, select_pods, PodLister, PreflightError, VersionGetter,
};
