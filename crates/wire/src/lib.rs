// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kpture-wire: the gRPC protocol between agents, the collector, and the
//! controller.
//!
//! Generated from `proto/kpture.proto`. The file descriptor set is embedded
//! for server reflection.

tonic::include_proto!("kpture");

/// Compiled descriptor set for `tonic-reflection`.
pub const FILE_DESCRIPTOR_SET: &[u8] =
    include_bytes!(concat!(env!("OUT_DIR"), "/kpture_descriptor.bin"));
