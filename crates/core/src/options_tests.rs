// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn agent_defaults() {
    let opts = AgentOptions::default();
    assert_eq!(opts.snaplen, 1500);
    assert!(!opts.promiscuous);
    assert_eq!(opts.device, "eth0");
    assert_eq!(opts.target_ip, None);
    assert_eq!(opts.target_port, 10000);
    assert_eq!(opts.setup_timeout, Duration::from_secs(20));
    assert!(opts.filter.is_empty());
}

#[test]
fn collector_defaults() {
    let opts = CollectorOptions::default();
    assert_eq!(opts.server_port, 10000);
    assert_eq!(opts.buffer_size, 1500);
    assert_eq!(opts.setup_timeout, Duration::from_secs(20));
}

#[test]
fn with_target_sets_endpoint() {
    let opts = AgentOptions::default().with_target("10.1.2.3", 9000);
    assert_eq!(opts.target_ip.as_deref(), Some("10.1.2.3"));
    assert_eq!(opts.target_port, 9000);
}
