// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn descriptor_carries_hostname_and_metadata() {
    let frame = CapturedFrame {
        data: vec![1, 2, 3],
        timestamp: 1700000000,
        capture_length: 3,
        length: 60,
    };

    let descriptor = descriptor("pod-a", 2, frame);
    assert_eq!(descriptor.name, "pod-a");

    let packet = descriptor.packet.unwrap();
    assert_eq!(packet.data, [1, 2, 3]);

    let info = packet.capture_info.unwrap();
    assert_eq!(info.timestamp, 1700000000);
    assert_eq!(info.capture_length, 3);
    assert_eq!(info.length, 60);
    assert_eq!(info.interface_index, 2);
}

#[test]
fn hostname_is_non_empty() {
    assert!(!read_hostname().unwrap().is_empty());
}

#[tokio::test]
async fn missing_target_refuses_startup() {
    let err = run(AgentOptions::default()).await.unwrap_err();
    assert!(matches!(err, AgentError::NoTarget));
}
