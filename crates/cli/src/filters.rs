// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broadcast noise kept out of capture files: IPv4 ARP request chatter and
//! ICMPv6 router solicitations.

use pnet::packet::arp::{ArpOperations, ArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::icmpv6::{Icmpv6Packet, Icmpv6Types};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv6::Ipv6Packet;
use pnet::packet::Packet as _;

pub fn is_noise(data: &[u8]) -> bool {
    is_arp_request(data) || is_router_solicitation(data)
}

/// ARP request with a 4-byte target protocol address (IPv4 broadcast noise).
pub fn is_arp_request(data: &[u8]) -> bool {
    let Some(ethernet) = EthernetPacket::new(data) else {
        return false;
    };
    if ethernet.get_ethertype() != EtherTypes::Arp {
        return false;
    }
    let Some(arp) = ArpPacket::new(ethernet.payload()) else {
        return false;
    };
    arp.get_operation() == ArpOperations::Request && arp.get_proto_addr_len() == 4
}

/// ICMPv6 Router Solicitation.
pub fn is_router_solicitation(data: &[u8]) -> bool {
    let Some(ethernet) = EthernetPacket::new(data) else {
        return false;
    };
    if ethernet.get_ethertype() != EtherTypes::Ipv6 {
        return false;
    }
    let Some(ipv6) = Ipv6Packet::new(ethernet.payload()) else {
        return false;
    };
    if ipv6.get_next_header() != IpNextHeaderProtocols::Icmpv6 {
        return false;
    }
    let Some(icmpv6) = Icmpv6Packet::new(ipv6.payload()) else {
        return false;
    };
    icmpv6.get_icmpv6_type() == Icmpv6Types::RouterSolicit
}

#[cfg(test)]
#[path = "filters_tests.rs"]
mod filters_tests;
