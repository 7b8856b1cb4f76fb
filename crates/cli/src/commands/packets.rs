// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kpture packets` - the capture session controller.
//!
//! Runs the full session lifecycle exactly once: preflight, collector
//! deployment, tunnel, sniffer injection, stream consumption, teardown.
//! Teardown runs on stream end, on any post-deployment error, and on
//! SIGINT/SIGTERM.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use k8s_openapi::api::core::v1::Pod;
use tokio_util::sync::CancellationToken;

use kpture_core::{collector_pod_name, new_session_id, AgentOptions, CollectorOptions};
use kpture_k8s::{
    check_ephemeral_support, deploy_collector, ensure_running, inject_agents, select_pods,
    start_forward, teardown_collector, watch_agents, Cluster, PortForwarder,
};
use kpture_wire::client_service_client::ClientServiceClient;
use kpture_wire::Empty;

use crate::filters;
use crate::sink::PcapSink;

#[derive(Args)]
pub struct PacketsArgs {
    /// Pods to capture from
    pub pods: Vec<String>,

    /// Capture from all pods in the selected namespace
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Print raw pcap bytes to stdout (for tshark/wireshark)
    #[arg(short = 'r', long)]
    pub raw: bool,

    /// Output folder for capture files
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Capture filter applied at each agent, BPF syntax
    #[arg(short = 'f', long, default_value = "")]
    pub filter: String,

    /// Split pcap files per pod
    #[arg(short = 's', long, default_value_t = true, action = clap::ArgAction::Set)]
    pub split: bool,

    /// Kubernetes namespace (defaults to the current context's)
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,
}

pub async fn packets(args: PacketsArgs) -> Result<()> {
    validate(&args)?;

    let cluster = Cluster::connect(args.namespace.clone()).await?;
    check_ephemeral_support(&cluster.client()).await?;

    let pods_api = cluster.pods();
    let pods = select_pods(&args.pods, args.all, &pods_api).await?;
    ensure_running(&pods)?;

    let session_id = new_session_id();
    let agent_opts = AgentOptions {
        session_id: session_id.clone(),
        filter: args.filter.clone(),
        ..AgentOptions::default()
    };
    let collector_opts = CollectorOptions {
        session_id: session_id.clone(),
        ..CollectorOptions::default()
    };

    let mut sink = PcapSink::open(
        args.output.as_deref(),
        args.raw,
        args.split,
        &pods,
        agent_opts.snaplen.unsigned_abs(),
    )?;

    // Everything below mutates the cluster; teardown runs on every exit
    // path from here on.
    let stop = CancellationToken::new();
    let result = tokio::select! {
        result = run_session(&cluster, &pods, agent_opts, &collector_opts, &mut sink, stop.clone()) => result,
        signal = shutdown_signal() => {
            tracing::info!(%signal, "interrupt received, tearing down");
            Err(anyhow!("interrupted"))
        }
    };

    stop.cancel();
    tracing::info!("tearing down");
    if let Err(err) = teardown_collector(&pods_api, &session_id).await {
        tracing::warn!(error = %err, "collector teardown failed");
    }
    sink.close();
    result
}

async fn run_session(
    cluster: &Cluster,
    pods: &[Pod],
    agent_opts: AgentOptions,
    collector_opts: &CollectorOptions,
    sink: &mut PcapSink,
    stop: CancellationToken,
) -> Result<()> {
    let pods_api = cluster.pods();

    tracing::info!("deploying collector");
    let collector_ip = deploy_collector(&pods_api, collector_opts).await?;
    let agent_opts = agent_opts.with_target(collector_ip, collector_opts.server_port);

    tracing::info!("forwarding collector port");
    let forwarder = PortForwarder::bind(
        pods_api.clone(),
        collector_pod_name(&collector_opts.session_id),
        collector_opts.server_port,
    )
    .await?;
    let local_port = forwarder.local_port()?;
    start_forward(forwarder, stop.clone(), agent_opts.setup_timeout).await?;

    tracing::info!(count = pods.len(), "injecting sniffers");
    inject_agents(pods, &pods_api, &agent_opts).await?;

    // Best-effort: surfaces sniffers that fail to start, never blocks the
    // stream.
    let targets: Vec<String> = pods.iter().filter_map(|pod| pod.metadata.name.clone()).collect();
    tokio::spawn(watch_agents(pods_api, targets, agent_opts.session_id.clone()));

    let mut client = ClientServiceClient::connect(format!("http://127.0.0.1:{local_port}"))
        .await
        .context("could not reach collector through the tunnel")?;
    let mut frames = client.get_packets(Empty {}).await?.into_inner();

    tracing::info!("capture started, press Ctrl+C to stop");
    while let Some(frame) = frames.message().await? {
        let data = frame
            .packet
            .as_ref()
            .map(|packet| packet.data.as_slice())
            .unwrap_or_default();
        if filters::is_noise(data) {
            continue;
        }
        sink.write(&frame)?;
    }
    Ok(())
}

fn validate(args: &PacketsArgs) -> Result<()> {
    if args.output.is_none() && !args.raw {
        bail!("must provide output and/or raw flag");
    }
    Ok(())
}

async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let ctrl_c = tokio::signal::ctrl_c();
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = ctrl_c => "interrupt",
                _ = sigterm.recv() => "terminate",
            }
        }
        Err(_) => {
            let _ = ctrl_c.await;
            "interrupt"
        }
    }
}

#[cfg(test)]
#[path = "packets_tests.rs"]
mod packets_tests;
