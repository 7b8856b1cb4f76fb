// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kpture_wire::{CaptureInfo, Packet};
use pcap_file::pcap::PcapReader;

fn pod(name: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..ObjectMeta::default()
        },
        ..Pod::default()
    }
}

fn frame(name: &str, data: &[u8], wire_length: i64) -> PacketDescriptor {
    PacketDescriptor {
        name: name.to_string(),
        packet: Some(Packet {
            data: data.to_vec(),
            capture_info: Some(CaptureInfo {
                timestamp: 1700000000,
                capture_length: data.len() as i64,
                length: wire_length,
                interface_index: 1,
            }),
        }),
    }
}

fn read_header(path: &std::path::Path) -> (u32, DataLink) {
    let reader = PcapReader::new(std::fs::File::open(path).unwrap()).unwrap();
    let header = reader.header();
    (header.snaplen, header.datalink)
}

fn read_packets(path: &std::path::Path) -> Vec<(u32, Vec<u8>)> {
    let mut reader = PcapReader::new(std::fs::File::open(path).unwrap()).unwrap();
    let mut packets = Vec::new();
    while let Some(packet) = reader.next_packet() {
        let packet = packet.unwrap();
        packets.push((packet.orig_len, packet.data.into_owned()));
    }
    packets
}

#[test]
fn headers_are_written_before_any_frame() {
    let dir = tempfile::tempdir().unwrap();
    let sink = PcapSink::open(Some(dir.path()), false, true, &[pod("a")], 1500).unwrap();
    sink.close();

    let path = dir.path().join(GLOBAL_FILE);
    let (snaplen, datalink) = read_header(&path);
    assert_eq!(snaplen, 1500);
    assert_eq!(datalink, DataLink::ETHERNET);
    assert!(read_packets(&path).is_empty());
}

#[test]
fn frames_route_to_pod_and_global_writers() {
    let dir = tempfile::tempdir().unwrap();
    let pods = [pod("a"), pod("b")];
    let mut sink = PcapSink::open(Some(dir.path()), false, true, &pods, 1500).unwrap();

    sink.write(&frame("a", &[1, 2, 3], 60)).unwrap();
    sink.write(&frame("b", &[4, 5], 42)).unwrap();
    // A frame from a pod without its own writer still reaches the
    // aggregated file.
    sink.write(&frame("c", &[9], 9)).unwrap();
    sink.close();

    let aggregate = read_packets(&dir.path().join(GLOBAL_FILE));
    assert_eq!(
        aggregate,
        [(60, vec![1, 2, 3]), (42, vec![4, 5]), (9, vec![9])]
    );

    assert_eq!(read_packets(&dir.path().join("a.pcap")), [(60, vec![1, 2, 3])]);
    assert_eq!(read_packets(&dir.path().join("b.pcap")), [(42, vec![4, 5])]);
    assert!(!dir.path().join("c.pcap").exists());
}

#[test]
fn single_pod_sessions_are_not_split() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = PcapSink::open(Some(dir.path()), false, true, &[pod("a")], 1500).unwrap();
    sink.write(&frame("a", &[1], 1)).unwrap();
    sink.close();

    assert!(dir.path().join(GLOBAL_FILE).exists());
    assert!(!dir.path().join("a.pcap").exists());
}

#[test]
fn split_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let pods = [pod("a"), pod("b")];
    let sink = PcapSink::open(Some(dir.path()), false, false, &pods, 1500).unwrap();
    sink.close();

    assert!(!dir.path().join("a.pcap").exists());
    assert!(!dir.path().join("b.pcap").exists());
}

#[test]
fn no_output_directory_without_flags() {
    let sink = PcapSink::open(None, false, true, &[pod("a")], 1500).unwrap();
    sink.close();
}
