// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn filter_without_user_expression() {
    assert_eq!(compose_filter("", 10000), "port not 10000");
    assert_eq!(compose_filter("   ", 10000), "port not 10000");
}

#[test]
fn filter_composes_with_user_expression() {
    assert_eq!(
        compose_filter("tcp port 80", 10000),
        "(tcp port 80) and port not 10000"
    );
}

#[test]
fn filter_tracks_collector_port() {
    assert_eq!(compose_filter("", 9999), "port not 9999");
}

#[test]
fn unknown_interface_index_is_zero() {
    assert_eq!(interface_index("definitely-not-a-device-0"), 0);
}
