// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The agent main loop: register with the collector, then pump frames out
//! until the collector tells us to stop.

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use kpture_core::AgentOptions;
use kpture_wire::agent_service_client::AgentServiceClient;
use kpture_wire::{CaptureInfo, Packet, PacketDescriptor, Pod};

use crate::capture::{self, CapturedFrame};
use crate::AgentError;

/// Outbound stream buffer between the capture channel and tonic.
const STREAM_CHANNEL: usize = 64;

/// Capture and forward until the collector closes or signals shutdown.
///
/// Returns `Ok(())` on the collector's shutdown signal or a clean
/// end-of-stream; anything else is fatal and the caller writes it to the
/// termination-message file before exiting non-zero.
pub async fn run(opts: AgentOptions) -> Result<(), AgentError> {
    let hostname = read_hostname()?;
    let target = opts.target_ip.as_deref().ok_or(AgentError::NoTarget)?;
    let endpoint = format!("http://{}:{}", target, opts.target_port);

    let source = capture::open_source(&opts)?;
    let interface_index = capture::interface_index(&opts.device);

    let mut client = AgentServiceClient::connect(endpoint)
        .await
        .map_err(AgentError::Connect)?;
    client
        .ready(Pod { name: String::new() })
        .await
        .map_err(AgentError::Stream)?;

    let (frames_tx, frames_rx) = mpsc::channel::<PacketDescriptor>(STREAM_CHANNEL);
    let mut inbound = client
        .add_packet(ReceiverStream::new(frames_rx))
        .await
        .map_err(AgentError::Stream)?
        .into_inner();

    let mut captured = capture::spawn_reader(source);
    tracing::info!(%hostname, device = %opts.device, "agent streaming");

    loop {
        tokio::select! {
            message = inbound.message() => {
                // Anything from the collector — a shutdown Empty or a clean
                // end-of-stream — means the session is over.
                return match message {
                    Ok(_) => Ok(()),
                    Err(status) => Err(AgentError::Stream(status)),
                };
            }
            frame = captured.recv() => {
                let Some(frame) = frame else {
                    return Err(AgentError::SourceClosed);
                };
                let descriptor = descriptor(&hostname, interface_index, frame);
                if frames_tx.send(descriptor).await.is_err() {
                    // Peer closed our outbound stream: normal end.
                    return Ok(());
                }
            }
        }
    }
}

fn read_hostname() -> Result<String, AgentError> {
    let hostname = nix::unistd::gethostname().map_err(AgentError::Hostname)?;
    Ok(hostname.to_string_lossy().into_owned())
}

fn descriptor(hostname: &str, interface_index: i64, frame: CapturedFrame) -> PacketDescriptor {
    PacketDescriptor {
        name: hostname.to_string(),
        packet: Some(Packet {
            data: frame.data,
            capture_info: Some(CaptureInfo {
                timestamp: frame.timestamp,
                capture_length: frame.capture_length,
                length: frame.length,
                interface_index,
            }),
        }),
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod run_tests;
