// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn records_error_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("termination-log");

    let mut writer = TerminationWriter::open(Some(&path)).unwrap();
    writer.record(&"cannot open device eth9").unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "cannot open device eth9"
    );
}

#[test]
fn appends_across_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("termination-log");

    let mut writer = TerminationWriter::open(Some(&path)).unwrap();
    writer.record(&"first").unwrap();
    writer.record(&" second").unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "first second");
}

#[test]
fn disabled_writer_is_a_no_op() {
    let mut writer = TerminationWriter::open(None).unwrap();
    writer.record(&"ignored").unwrap();
}
