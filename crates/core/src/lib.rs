// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kpture-core: shared configuration records and session naming for the
//! kpture capture tool.

pub mod options;
pub mod session;
pub mod termination;

pub use options::{AgentOptions, CollectorOptions};
pub use session::{collector_pod_name, new_session_id, sniffer_container_name};
pub use termination::TerminationWriter;
