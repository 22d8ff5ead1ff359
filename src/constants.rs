//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every default can be overridden through an environment variable.

use std::path::PathBuf;

/// Tick interval (seconds) between two sampling passes
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 5;

/// Maximum number of delta records retained in the session history
pub const DEFAULT_HISTORY_CAP: usize = 500;

/// Timeout for a single geolocation lookup (milliseconds)
pub const DEFAULT_GEO_TIMEOUT_MS: u64 = 2_000;

/// Geolocation endpoint, `{base}/{ip}/json`
pub const DEFAULT_GEO_API_BASE: &str = "https://ipinfo.io";

/// Number of most recent records inspected by the recent-anomaly view
pub const RECENT_ANOMALY_WINDOW: usize = 200;

/// How many IP addresses the "top talkers" view returns
pub const TOP_IP_LIMIT: usize = 10;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "WiFi Guardian";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get tick interval from environment or use default
pub fn get_tick_interval_secs() -> u64 {
    std::env::var("GUARDIAN_TICK_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&secs| secs > 0)
        .unwrap_or(DEFAULT_TICK_INTERVAL_SECS)
}

/// Get history cap from environment or use default
pub fn get_history_cap() -> usize {
    std::env::var("GUARDIAN_HISTORY_CAP")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&cap| cap > 0)
        .unwrap_or(DEFAULT_HISTORY_CAP)
}

/// Get geolocation timeout from environment or use default
pub fn get_geo_timeout_ms() -> u64 {
    std::env::var("GUARDIAN_GEO_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_GEO_TIMEOUT_MS)
}

/// Check if geolocation lookups are enabled
pub fn is_geo_enabled() -> bool {
    std::env::var("GUARDIAN_GEO_ENABLED")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}

/// Interfaces explicitly requested by the user (empty = use heuristic)
pub fn get_selected_interfaces() -> Vec<String> {
    std::env::var("GUARDIAN_INTERFACES")
        .map(|s| parse_interface_list(&s))
        .unwrap_or_default()
}

/// Directory where reports are written
pub fn get_export_dir() -> PathBuf {
    std::env::var("GUARDIAN_EXPORT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("wifi-guardian")
                .join("reports")
        })
}

fn parse_interface_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
