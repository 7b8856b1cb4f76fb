// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capture output: the aggregated file, optional per-pod files, and the
//! optional pcap stream on stdout.
//!
//! Each writer emits its file header (link-type Ethernet, session snapshot
//! length) at open, before any frame arrives. Record timestamps are the
//! controller's wall clock at write time; frame bytes and both lengths pass
//! through unchanged.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Pod;
use pcap_file::pcap::{PcapHeader, PcapPacket, PcapWriter};
use pcap_file::DataLink;

use kpture_wire::PacketDescriptor;

/// Name of the aggregated capture file.
pub const GLOBAL_FILE: &str = "kpture.pcap";

pub struct PcapSink {
    pod_writers: HashMap<String, PcapWriter<File>>,
    global_writers: Vec<PcapWriter<Box<dyn Write + Send>>>,
}

impl PcapSink {
    /// Open the writers the flags ask for: the aggregated file whenever an
    /// output directory is given, per-pod files only for a split multi-pod
    /// session, stdout only for `--raw`.
    pub fn open(
        output: Option<&Path>,
        raw: bool,
        split: bool,
        pods: &[Pod],
        snaplen: u32,
    ) -> Result<Self> {
        let mut sink = Self {
            pod_writers: HashMap::new(),
            global_writers: Vec::new(),
        };

        if let Some(dir) = output {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("could not create output directory {}", dir.display()))?;

            let path = dir.join(GLOBAL_FILE);
            let file = File::create(&path)
                .with_context(|| format!("could not create {}", path.display()))?;
            sink.global_writers
                .push(PcapWriter::with_header(Box::new(file) as Box<dyn Write + Send>, header(snaplen))?);

            if split && pods.len() > 1 {
                for pod in pods {
                    let Some(name) = pod.metadata.name.as_deref() else {
                        continue;
                    };
                    let path = dir.join(format!("{name}.pcap"));
                    let file = File::create(&path)
                        .with_context(|| format!("could not create {}", path.display()))?;
                    sink.pod_writers
                        .insert(name.to_string(), PcapWriter::with_header(file, header(snaplen))?);
                }
            }
        }

        if raw {
            sink.global_writers.push(PcapWriter::with_header(
                Box::new(std::io::stdout()) as Box<dyn Write + Send>,
                header(snaplen),
            )?);
        }

        Ok(sink)
    }

    /// Route one frame to the per-pod writer keyed by its source pod name
    /// and to every global writer.
    pub fn write(&mut self, frame: &PacketDescriptor) -> Result<()> {
        let Some(packet) = frame.packet.as_ref() else {
            return Ok(());
        };
        let info = packet.capture_info.clone().unwrap_or_default();
        let record = PcapPacket::new(now(), u32::try_from(info.length).unwrap_or(0), &packet.data);

        if let Some(writer) = self.pod_writers.get_mut(&frame.name) {
            writer.write_packet(&record)?;
        }
        for writer in &mut self.global_writers {
            writer.write_packet(&record)?;
        }
        Ok(())
    }

    /// Flush and close every writer. Failures are logged, not returned:
    /// close runs on teardown paths that already carry an error.
    pub fn close(self) {
        for (pod, writer) in self.pod_writers {
            if let Err(err) = writer.into_writer().flush() {
                tracing::warn!(%pod, error = %err, "could not flush capture file");
            }
        }
        for writer in self.global_writers {
            if let Err(err) = writer.into_writer().flush() {
                tracing::warn!(error = %err, "could not flush capture output");
            }
        }
    }
}

fn header(snaplen: u32) -> PcapHeader {
    PcapHeader {
        snaplen,
        datalink: DataLink::ETHERNET,
        ..PcapHeader::default()
    }
}

fn now() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod sink_tests;
