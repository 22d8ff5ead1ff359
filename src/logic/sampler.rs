//! Interface Sampler - Raw cumulative counters per network interface
//!
//! Reads the OS byte counters (cumulative since interface initialization)
//! and the addresses assigned to each interface. The OS access sits behind
//! [`CounterSource`] so the pipeline can be driven by a fake in tests.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sysinfo::Networks;

/// Names that usually belong to wireless adapters (Linux, macOS, Windows)
static WIRELESS_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(wi-?fi|wl)").expect("static regex is valid"));

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Raw counters of one interface as reported by the OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub name: String,
    pub cumulative_bytes_sent: u64,
    pub cumulative_bytes_recv: u64,
    pub addresses: Vec<IpAddr>,
}

impl InterfaceCounters {
    /// First IPv4 address assigned to the interface
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        self.addresses.iter().find_map(|addr| match addr {
            IpAddr::V4(v4) => Some(*v4),
            IpAddr::V6(_) => None,
        })
    }
}

/// One observation of an interface at a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSample {
    pub interface_name: String,
    pub timestamp: DateTime<Utc>,
    pub cumulative_bytes_sent: u64,
    pub cumulative_bytes_recv: u64,
}

// ============================================================================
// COUNTER SOURCE
// ============================================================================

/// Provider of per-interface cumulative counters
pub trait CounterSource: Send {
    /// Current counters keyed by interface name
    fn sample(&mut self) -> HashMap<String, InterfaceCounters>;

    /// Every interface currently known to the provider
    fn interface_names(&mut self) -> Vec<String> {
        let mut names: Vec<String> = self.sample().into_keys().collect();
        names.sort();
        names
    }
}

/// Counter source backed by `sysinfo`
pub struct SysinfoSource {
    networks: Networks,
}

impl SysinfoSource {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for SysinfoSource {
    fn sample(&mut self) -> HashMap<String, InterfaceCounters> {
        // Picks up interfaces that appeared since the last tick
        self.networks.refresh_list();

        self.networks
            .iter()
            .map(|(name, data)| {
                let counters = InterfaceCounters {
                    name: name.clone(),
                    cumulative_bytes_sent: data.total_transmitted(),
                    cumulative_bytes_recv: data.total_received(),
                    addresses: data.ip_networks().iter().map(|net| net.addr).collect(),
                };
                (name.clone(), counters)
            })
            .collect()
    }
}

// ============================================================================
// INTERFACE DISCOVERY
// ============================================================================

/// Check whether an interface name looks like a wireless adapter
pub fn is_wireless_name(name: &str) -> bool {
    WIRELESS_NAME.is_match(name)
}

/// Pick the interfaces to monitor when the user selected none.
///
/// Wireless-looking names win; otherwise the first interface is used.
pub fn default_interfaces(all: &[String]) -> Vec<String> {
    let wireless: Vec<String> = all
        .iter()
        .filter(|name| is_wireless_name(name))
        .cloned()
        .collect();

    if !wireless.is_empty() {
        return wireless;
    }

    all.first().cloned().into_iter().collect()
}

/// List interfaces through a counter source
pub fn list_interfaces(source: &mut dyn CounterSource) -> Vec<String> {
    source.interface_names()
}
