// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kpture proxy` - the collector entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use kpture_core::options::{DEFAULT_BUFFER_SIZE, DEFAULT_COLLECTOR_PORT};
use kpture_core::termination::DEFAULT_MESSAGE_PATH;
use kpture_core::{CollectorOptions, TerminationWriter};

#[derive(Args)]
pub struct ProxyArgs {
    /// gRPC server port
    #[arg(short = 'p', long, default_value_t = DEFAULT_COLLECTOR_PORT)]
    pub port: u16,

    /// Frame buffer size
    #[arg(short = 's', long = "buffer-size", default_value_t = DEFAULT_BUFFER_SIZE)]
    pub buffer_size: usize,

    /// Termination message path
    #[arg(short = 'm', long = "message-path", default_value = DEFAULT_MESSAGE_PATH)]
    pub message_path: PathBuf,

    /// Toggle termination message writing
    #[arg(short = 't', long = "toggle-message-path", default_value_t = true, action = clap::ArgAction::Set)]
    pub toggle_message_path: bool,
}

pub async fn proxy(args: ProxyArgs) -> Result<()> {
    let mut termination =
        TerminationWriter::open(args.toggle_message_path.then_some(args.message_path.as_path()))?;

    let opts = CollectorOptions {
        server_port: args.port,
        buffer_size: args.buffer_size,
        ..CollectorOptions::default()
    };

    if let Err(err) = kpture_collector::serve(&opts).await {
        if let Err(write_err) = termination.record(&err) {
            tracing::warn!(error = %write_err, "could not write termination message");
        }
        return Err(err.into());
    }
    Ok(())
}
