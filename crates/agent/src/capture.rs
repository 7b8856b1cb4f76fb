// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live packet source: open, filter, and pump frames into a channel.

use pcap::{Active, Capture};
use tokio::sync::mpsc;

use kpture_core::AgentOptions;

use crate::AgentError;

/// Backpressure between the blocking capture thread and the send loop.
const FRAME_CHANNEL: usize = 64;

/// One frame as it came off the wire.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub data: Vec<u8>,
    /// Seconds since the Unix epoch, agent clock.
    pub timestamp: i64,
    pub capture_length: i64,
    pub length: i64,
}

/// The capture filter always excludes the collector port so the agent never
/// captures its own stream back to the collector.
pub fn compose_filter(user_filter: &str, collector_port: u16) -> String {
    let feedback_guard = format!("port not {collector_port}");
    let user_filter = user_filter.trim();
    if user_filter.is_empty() {
        feedback_guard
    } else {
        format!("({user_filter}) and {feedback_guard}")
    }
}

/// Open the live source with the configured snapshot length, promiscuous
/// mode off, and immediate delivery, and compile the composed filter.
pub fn open_source(opts: &AgentOptions) -> Result<Capture<Active>, AgentError> {
    let mut capture = Capture::from_device(opts.device.as_str())
        .map_err(AgentError::OpenDevice)?
        .snaplen(opts.snaplen)
        .promisc(opts.promiscuous)
        .immediate_mode(true)
        .timeout(-1)
        .open()
        .map_err(AgentError::OpenDevice)?;

    capture
        .filter(&compose_filter(&opts.filter, opts.target_port), true)
        .map_err(AgentError::Filter)?;
    Ok(capture)
}

/// Interface index reported in frame metadata; 0 when unresolvable.
pub fn interface_index(device: &str) -> i64 {
    nix::net::if_::if_nametoindex(device)
        .map(i64::from)
        .unwrap_or(0)
}

/// Read the source on a dedicated thread (libpcap blocks) and hand frames
/// to the async side. The thread stops once the receiver is gone.
pub fn spawn_reader(mut capture: Capture<Active>) -> mpsc::Receiver<CapturedFrame> {
    let (frames_tx, frames_rx) = mpsc::channel(FRAME_CHANNEL);
    std::thread::spawn(move || loop {
        match capture.next_packet() {
            Ok(packet) => {
                let frame = CapturedFrame {
                    data: packet.data.to_vec(),
                    timestamp: packet.header.ts.tv_sec as i64,
                    capture_length: i64::from(packet.header.caplen),
                    length: i64::from(packet.header.len),
                };
                if frames_tx.blocking_send(frame).is_err() {
                    break;
                }
            }
            Err(pcap::Error::TimeoutExpired) => {}
            Err(err) => {
                tracing::error!(error = %err, "capture source failed");
                break;
            }
        }
    });
    frames_rx
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod capture_tests;
