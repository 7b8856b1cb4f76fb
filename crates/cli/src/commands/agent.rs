// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kpture agent` - the sniffer sidecar entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use kpture_core::options::{DEFAULT_COLLECTOR_PORT, DEFAULT_DEVICE, DEFAULT_SNAPLEN};
use kpture_core::termination::DEFAULT_MESSAGE_PATH;
use kpture_core::{AgentOptions, TerminationWriter};

#[derive(Args)]
pub struct AgentArgs {
    /// Capture device
    #[arg(short = 'd', long, default_value = DEFAULT_DEVICE)]
    pub device: String,

    /// Collector server address
    #[arg(short = 't', long)]
    pub target: Option<String>,

    /// Capture snapshot len
    #[arg(short = 'l', long, default_value_t = DEFAULT_SNAPLEN)]
    pub snaplen: i32,

    /// Collector server port
    #[arg(short = 'p', long, default_value_t = DEFAULT_COLLECTOR_PORT)]
    pub port: u16,

    /// Capture filter, BPF syntax
    #[arg(short = 'f', long, default_value = "")]
    pub filter: String,

    /// Termination message path
    #[arg(short = 'm', long = "message-path", default_value = DEFAULT_MESSAGE_PATH)]
    pub message_path: PathBuf,

    /// Toggle termination message writing
    #[arg(long = "toggle-message-path", default_value_t = true, action = clap::ArgAction::Set)]
    pub toggle_message_path: bool,
}

pub async fn agent(args: AgentArgs) -> Result<()> {
    let mut termination =
        TerminationWriter::open(args.toggle_message_path.then_some(args.message_path.as_path()))?;

    let opts = AgentOptions {
        device: args.device,
        snaplen: args.snaplen,
        target_ip: args.target,
        target_port: args.port,
        filter: args.filter,
        ..AgentOptions::default()
    };

    if let Err(err) = kpture_agent::run(opts).await {
        // Leave the cause where the controller's watcher can read it.
        if let Err(write_err) = termination.record(&err) {
            tracing::warn!(error = %write_err, "could not write termination message");
        }
        return Err(err.into());
    }
    Ok(())
}
