//! Geolocation - Best-effort location labels for interface addresses
//!
//! Loopback and private addresses are answered locally. Public addresses
//! go through one HTTP lookup bounded by a short timeout; any failure
//! yields [`UNKNOWN`] and never reaches the tick.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;
use serde::Deserialize;

use crate::constants::DEFAULT_GEO_API_BASE;

pub const LOCALHOST: &str = "Localhost";
pub const PRIVATE_NETWORK: &str = "Private Network";
pub const UNKNOWN: &str = "Unknown";

// ============================================================================
// TYPES
// ============================================================================

/// Resolves an IP address to a human-readable location label
pub trait GeoLocator: Send {
    fn locate(&self, ip: &str) -> String;
}

#[derive(Debug)]
pub enum GeoError {
    /// Lookup exceeded the configured timeout or the connection failed
    Network { message: String },
    /// Server answered with a non-success status
    Status { code: u16 },
    /// Body was not the expected JSON
    Parse { message: String },
    /// Response had no usable location field
    Empty,
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoError::Network { message } => write!(f, "Network error: {}", message),
            GeoError::Status { code } => write!(f, "Lookup failed with HTTP {}", code),
            GeoError::Parse { message } => write!(f, "Parse error: {}", message),
            GeoError::Empty => write!(f, "No location in response"),
        }
    }
}

impl std::error::Error for GeoError {}

#[derive(Debug, Default, Deserialize)]
struct IpInfoResponse {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

// ============================================================================
// ADDRESS CLASSIFICATION
// ============================================================================

/// Sentinel label for addresses that never need a lookup.
///
/// Returns `None` for public addresses.
pub fn local_label(ip: &str) -> Option<&'static str> {
    let ip = ip.trim();
    if ip.is_empty() {
        return Some(LOCALHOST);
    }

    match ip.parse::<IpAddr>() {
        Ok(addr) if addr.is_loopback() => Some(LOCALHOST),
        Ok(addr) if is_private_address(&addr) => Some(PRIVATE_NETWORK),
        Ok(_) => None,
        Err(_) => Some(UNKNOWN),
    }
}

/// Non-routable address ranges (RFC 1918, link-local, reserved, ULA)
pub fn is_private_address(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => is_private_v6(v6),
    }
}

fn is_private_v4(v4: &Ipv4Addr) -> bool {
    let [a, b, ..] = v4.octets();
    v4.is_private()
        || v4.is_link_local()
        || v4.is_documentation()
        || v4.is_broadcast()
        || a == 0
        || (a == 198 && (b & 0xfe) == 18) // 198.18.0.0/15
        || a >= 240
}

fn is_private_v6(v6: &Ipv6Addr) -> bool {
    let first = v6.segments()[0];
    v6.is_unspecified()
        || (first & 0xfe00) == 0xfc00 // fc00::/7
        || (first & 0xffc0) == 0xfe80 // fe80::/10
}

/// "city, region, country" with empty parts dropped
pub fn format_location(city: Option<&str>, region: Option<&str>, country: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [city, region, country]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() { None } else { Some(parts.join(", ")) }
}

// ============================================================================
// LOCATORS
// ============================================================================

/// Lookup through the ipinfo.io JSON API
pub struct IpInfoLocator {
    agent: ureq::Agent,
    api_base: String,
}

impl IpInfoLocator {
    pub fn new(timeout: Duration) -> Self {
        Self::with_base(DEFAULT_GEO_API_BASE, timeout)
    }

    pub fn with_base(api_base: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .build();

        Self {
            agent,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Single lookup, no retries
    pub fn lookup(&self, ip: &str) -> Result<String, GeoError> {
        let url = format!("{}/{}/json", self.api_base, ip);

        let response = match self.agent.get(&url).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, _)) => return Err(GeoError::Status { code }),
            Err(e) => return Err(GeoError::Network { message: e.to_string() }),
        };

        let body = response.into_string()
            .map_err(|e| GeoError::Network { message: e.to_string() })?;

        let info: IpInfoResponse = serde_json::from_str(&body)
            .map_err(|e| GeoError::Parse { message: e.to_string() })?;

        format_location(info.city.as_deref(), info.region.as_deref(), info.country.as_deref())
            .ok_or(GeoError::Empty)
    }
}

impl GeoLocator for IpInfoLocator {
    fn locate(&self, ip: &str) -> String {
        if let Some(label) = local_label(ip) {
            return label.to_string();
        }

        match self.lookup(ip) {
            Ok(label) => label,
            Err(e) => {
                log::debug!("Geolocation for {} unavailable: {}", ip, e);
                UNKNOWN.to_string()
            }
        }
    }
}

/// No network access: sentinels for local ranges, [`UNKNOWN`] otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineLocator;

impl GeoLocator for OfflineLocator {
    fn locate(&self, ip: &str) -> String {
        local_label(ip).unwrap_or(UNKNOWN).to_string()
    }
}
