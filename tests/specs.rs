// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level CLI specs.
//!
//! Only the paths that never touch a cluster: argument validation and help
//! output. The orchestration itself is covered by the capability-trait
//! mocks in kpture-k8s and the loopback broker tests in kpture-collector.

use assert_cmd::Command;

fn kpture() -> Command {
    match Command::cargo_bin("kpture") {
        Ok(cmd) => cmd,
        Err(err) => panic!("kpture binary not built: {err}"),
    }
}

#[test]
fn help_lists_the_three_roles() {
    kpture()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("packets"))
        .stdout(predicates::str::contains("agent"))
        .stdout(predicates::str::contains("proxy"));
}

#[test]
fn packets_requires_output_or_raw() {
    kpture()
        .arg("packets")
        .assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("must provide output and/or raw flag"));
}

#[test]
fn packets_help_shows_capture_flags() {
    kpture()
        .args(["packets", "--help"])
        .assert()
        .success()
        .stdout(predicates::str::contains("--all"))
        .stdout(predicates::str::contains("--raw"))
        .stdout(predicates::str::contains("--output"))
        .stdout(predicates::str::contains("--filter"))
        .stdout(predicates::str::contains("--split"));
}

#[test]
fn agent_help_shows_sidecar_flags() {
    kpture()
        .args(["agent", "--help"])
        .assert()
        .success()
        .stdout(predicates::str::contains("--device"))
        .stdout(predicates::str::contains("--target"))
        .stdout(predicates::str::contains("--snaplen"))
        .stdout(predicates::str::contains("--port"));
}

#[test]
fn proxy_help_shows_server_flags() {
    kpture()
        .args(["proxy", "--help"])
        .assert()
        .success()
        .stdout(predicates::str::contains("--port"))
        .stdout(predicates::str::contains("--buffer-size"));
}
