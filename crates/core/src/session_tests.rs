// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn session_ids_are_unique() {
    assert_ne!(new_session_id(), new_session_id());
}

#[test]
fn object_names_carry_the_session_id() {
    assert_eq!(collector_pod_name("abc"), "collector-abc");
    assert_eq!(sniffer_container_name("abc"), "sniffer-abc");
}
