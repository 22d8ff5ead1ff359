use std::net::IpAddr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::protocol::ProtocolLabel;

/// Placeholder shown for interfaces without an IPv4 address
pub const NO_ADDRESS: &str = "N/A";

/// One interface, one interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub interface_name: String,
    pub ip_address: Option<IpAddr>,
    pub location_label: String,

    // Per-interval bytes
    pub delta_bytes_sent: u64,
    pub delta_bytes_recv: u64,

    // Raw OS counters at sampling time
    pub cumulative_bytes_sent: u64,
    pub cumulative_bytes_recv: u64,

    pub protocol_label: ProtocolLabel,
}

impl DeltaRecord {
    pub fn ip_display(&self) -> String {
        self.ip_address
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| NO_ADDRESS.to_string())
    }
}
