// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `kpture` - Kubernetes packet capture tool.
//!
//! One binary, three roles: `packets` is the controller on the operator's
//! machine; `agent` and `proxy` are the commands the injected sidecar and
//! the collector pod run.

mod commands;
mod filters;
mod sink;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kpture", about = "Kubernetes packet capture tool", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Capture packets from kubernetes pods
    Packets(commands::packets::PacketsArgs),
    /// Start the sniffer agent (runs inside a target pod)
    Agent(commands::agent::AgentArgs),
    /// Start the collector proxy (runs as the collector pod)
    Proxy(commands::proxy::ProxyArgs),
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout may carry a raw pcap stream.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Packets(args) => commands::packets::packets(args).await,
        Command::Agent(args) => commands::agent::agent(args).await,
        Command::Proxy(args) => commands::proxy::proxy(args).await,
    };

    if let Err(err) = result {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
}
