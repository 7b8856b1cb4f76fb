// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn args() -> PacketsArgs {
    PacketsArgs {
        pods: Vec::new(),
        all: false,
        raw: false,
        output: None,
        filter: String::new(),
        split: true,
        namespace: None,
    }
}

#[test]
fn output_or_raw_is_required() {
    let err = validate(&args()).unwrap_err();
    assert_eq!(err.to_string(), "must provide output and/or raw flag");
}

#[test]
fn raw_alone_is_enough() {
    let mut args = args();
    args.raw = true;
    validate(&args).unwrap();
}

#[test]
fn output_alone_is_enough() {
    let mut args = args();
    args.output = Some(PathBuf::from("/tmp/cap"));
    validate(&args).unwrap();
}
