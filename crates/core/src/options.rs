// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration records for the sniffer agent and the collector.
//!
//! Both records are plain structs with defaulted fields. The controller
//! fills in the session id and the collector endpoint once they are known;
//! everything else comes from flags or stays at its default.

use std::time::Duration;

/// Default capture snapshot length, in bytes.
pub const DEFAULT_SNAPLEN: i32 = 1500;
/// Default capture device inside a pod.
pub const DEFAULT_DEVICE: &str = "eth0";
/// Default collector gRPC server port.
pub const DEFAULT_COLLECTOR_PORT: u16 = 10000;
/// Default collector frame buffer capacity.
pub const DEFAULT_BUFFER_SIZE: usize = 1500;
/// Default timeout for collector-pod readiness and tunnel readiness.
pub const DEFAULT_SETUP_TIMEOUT: Duration = Duration::from_secs(20);

/// Options for one sniffer agent.
///
/// `target_ip` and `target_port` are unset until the collector pod is
/// running; [`AgentOptions::with_target`] fills them in.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Capture snapshot length (pcap_set_snaplen).
    pub snaplen: i32,
    /// Promiscuous mode (pcap_set_promisc). Off: the pod only sees its own
    /// traffic anyway.
    pub promiscuous: bool,
    /// Capture device (pcap_create).
    pub device: String,
    /// Collector endpoint address.
    pub target_ip: Option<String>,
    /// Collector endpoint port.
    pub target_port: u16,
    /// Session id carried in the sniffer container name.
    pub session_id: String,
    /// User-supplied capture filter, BPF syntax. May be empty.
    pub filter: String,
    /// Timeout for ephemeral container injection and tunnel readiness.
    pub setup_timeout: Duration,
    /// Termination-message file, written on fatal errors.
    pub message_path: Option<std::path::PathBuf>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            snaplen: DEFAULT_SNAPLEN,
            promiscuous: false,
            device: DEFAULT_DEVICE.to_string(),
            target_ip: None,
            target_port: DEFAULT_COLLECTOR_PORT,
            session_id: String::new(),
            filter: String::new(),
            setup_timeout: DEFAULT_SETUP_TIMEOUT,
            message_path: None,
        }
    }
}

impl AgentOptions {
    /// Record the collector endpoint once the collector pod has an IP.
    pub fn with_target(mut self, ip: impl Into<String>, port: u16) -> Self {
        self.target_ip = Some(ip.into());
        self.target_port = port;
        self
    }
}

/// Options for the collector pod and its server.
#[derive(Debug, Clone)]
pub struct CollectorOptions {
    /// gRPC server port exposed by the collector container.
    pub server_port: u16,
    /// Session id carried in the collector pod name.
    pub session_id: String,
    /// Timeout for the collector pod to reach Running.
    pub setup_timeout: Duration,
    /// Frame buffer capacity between agent streams and the client stream.
    pub buffer_size: usize,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_COLLECTOR_PORT,
            session_id: String::new(),
            setup_timeout: DEFAULT_SETUP_TIMEOUT,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod options_tests;
