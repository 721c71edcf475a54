//! Network domain parsers: per-interface link-statistics blocks, the
//! address listing merged in by interface name, and the socket summary.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::commands::SECTION_SEPARATOR;
use crate::error::ParseError;
use crate::snapshot::{InterfaceInfo, LinkStatus, SocketSummary};

use super::{clean_lines, normalized_lines};

/// Interface block header: `2: eth0: <BROADCAST,MULTICAST,UP,...> mtu 1500 ...`
/// (captures name, flag list, optional mtu; tolerates `veth@if3` names).
static LINK_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):\s+([^:@\s]+)(?:@\S+)?:\s+<([^>]*)>(?:.*?\bmtu\s+(\d+))?").unwrap()
});

static SOCK_TOTAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Total:\s+(\d+)").unwrap());
static SOCK_TCP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^TCP:\s+(\d+)").unwrap());
static SOCK_ESTAB_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"estab (\d+)").unwrap());
static SOCK_TIMEWAIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"timewait (\d+)").unwrap());
static SOCK_UDP_ROW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^UDP\s+(\d+)").unwrap());

enum CounterBlock {
    Rx,
    Tx,
}

/// Splits the combined link+address invocation at the separator token.
/// Output without the separator is treated as link statistics only.
pub fn split_combined(raw: &str) -> (&str, &str) {
    match raw.split_once(SECTION_SEPARATOR) {
        Some((links, addrs)) => (links, addrs),
        None => (raw, ""),
    }
}

/// Parses per-interface blocks of the link-statistics output. Loopback is
/// excluded. Speed fields are left at zero; the collector derives them
/// from the counters.
pub fn parse_link_stats(raw: &str) -> Vec<InterfaceInfo> {
    let mut interfaces: Vec<InterfaceInfo> = Vec::new();
    let mut current: Option<InterfaceInfo> = None;
    let mut pending: Option<CounterBlock> = None;

    for line in normalized_lines(raw) {
        if let Some(caps) = LINK_HEADER_RE.captures(line) {
            if let Some(done) = current.take() {
                interfaces.push(done);
            }
            pending = None;

            let name = caps[2].to_string();
            if name == "lo" {
                continue;
            }
            let flags = &caps[3];
            let status = if flags.split(',').any(|flag| flag == "UP") {
                LinkStatus::Up
            } else {
                LinkStatus::Down
            };
            current = Some(InterfaceInfo {
                name,
                status,
                mtu: caps.get(4).and_then(|m| m.as_str().parse().ok()),
                ..InterfaceInfo::default()
            });
            continue;
        }

        let Some(interface) = current.as_mut() else {
            continue;
        };
        let trimmed = line.trim_start();

        if let Some(rest) = trimmed.strip_prefix("link/ether") {
            interface.mac = rest.split_whitespace().next().map(str::to_string);
            continue;
        }
        if trimmed.starts_with("RX:") {
            pending = Some(CounterBlock::Rx);
            continue;
        }
        if trimmed.starts_with("TX:") {
            pending = Some(CounterBlock::Tx);
            continue;
        }

        // counter line under the RX:/TX: label: bytes packets errors ...
        if let Some(block) = pending.take() {
            let fields: Vec<u64> = trimmed
                .split_whitespace()
                .map(|token| token.parse().unwrap_or(0))
                .collect();
            if fields.len() < 3 {
                continue;
            }
            match block {
                CounterBlock::Rx => {
                    interface.rx_bytes = fields[0];
                    interface.rx_errors = fields[2];
                }
                CounterBlock::Tx => {
                    interface.tx_bytes = fields[0];
                    interface.tx_errors = fields[2];
                }
            }
        }
    }

    if let Some(done) = current.take() {
        interfaces.push(done);
    }
    interfaces
}

/// Parses the one-line-per-address listing into per-interface IPv4/IPv6
/// address lists. Loopback addresses are filtered out.
pub fn parse_addresses(raw: &str) -> HashMap<String, (Vec<String>, Vec<String>)> {
    let mut by_interface: HashMap<String, (Vec<String>, Vec<String>)> = HashMap::new();

    for line in clean_lines(raw) {
        let Some(row) = super::schema::ADDR_SCHEMA.parse_line(line) else {
            continue;
        };
        let Some(name) = row.get("name") else { continue };
        let Some(family) = row.get("family") else { continue };
        let Some(address) = row.get("address") else { continue };

        let address = address.split('/').next().unwrap_or(address);
        if address.starts_with("127.") || address == "::1" {
            continue;
        }

        let entry = by_interface.entry(name.to_string()).or_default();
        match family {
            "inet" => entry.0.push(address.to_string()),
            "inet6" => entry.1.push(address.to_string()),
            _ => {}
        }
    }

    by_interface
}

/// Merges parsed addresses into the interface records by name.
pub fn merge_addresses(
    interfaces: &mut [InterfaceInfo],
    mut addresses: HashMap<String, (Vec<String>, Vec<String>)>,
) {
    for interface in interfaces {
        if let Some((ipv4, ipv6)) = addresses.remove(&interface.name) {
            interface.ipv4 = ipv4;
            interface.ipv6 = ipv6;
        }
    }
}

/// Parses the socket-statistics summary. Individual missing lines leave
/// zeros; output matching none of the expected lines is a parse error and
/// the collector decides the fallback.
pub fn parse_socket_summary(raw: &str) -> Result<SocketSummary, ParseError> {
    let mut summary = SocketSummary::default();
    let mut matched = false;

    for line in clean_lines(raw) {
        if let Some(caps) = SOCK_TOTAL_RE.captures(line) {
            summary.total = caps[1].parse().unwrap_or(0);
            matched = true;
        } else if let Some(caps) = SOCK_TCP_RE.captures(line) {
            summary.tcp = caps[1].parse().unwrap_or(0);
            if let Some(caps) = SOCK_ESTAB_RE.captures(line) {
                summary.tcp_established = caps[1].parse().unwrap_or(0);
            }
            if let Some(caps) = SOCK_TIMEWAIT_RE.captures(line) {
                summary.tcp_time_wait = caps[1].parse().unwrap_or(0);
            }
            matched = true;
        } else if let Some(caps) = SOCK_UDP_ROW_RE.captures(line) {
            summary.udp = caps[1].parse().unwrap_or(0);
            matched = true;
        }
    }

    if !matched {
        return Err(ParseError::new(
            "network",
            "no recognizable socket summary lines",
        ));
    }
    Ok(summary)
}
