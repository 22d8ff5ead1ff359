//! Monitor Configuration
//!
//! Runtime knobs of a monitoring session, resolved once at startup.

use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::anomaly::DetectorConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between two ticks
    pub tick_interval_secs: u64,

    /// Maximum records kept in history
    pub history_cap: usize,

    /// Geolocation lookup timeout (ms)
    pub geo_timeout_ms: u64,

    /// Disable to skip all outbound geolocation requests
    pub geo_enabled: bool,

    /// Interfaces to monitor; empty = pick with the wireless heuristic
    pub interfaces: Vec<String>,

    /// Where exported reports land
    pub export_dir: PathBuf,

    /// Isolation forest parameters
    pub detector: DetectorConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: constants::DEFAULT_TICK_INTERVAL_SECS,
            history_cap: constants::DEFAULT_HISTORY_CAP,
            geo_timeout_ms: constants::DEFAULT_GEO_TIMEOUT_MS,
            geo_enabled: true,
            interfaces: Vec::new(),
            export_dir: PathBuf::from("."),
            detector: DetectorConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Build from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            tick_interval_secs: constants::get_tick_interval_secs(),
            history_cap: constants::get_history_cap(),
            geo_timeout_ms: constants::get_geo_timeout_ms(),
            geo_enabled: constants::is_geo_enabled(),
            interfaces: constants::get_selected_interfaces(),
            export_dir: constants::get_export_dir(),
            detector: DetectorConfig::default(),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn geo_timeout(&self) -> Duration {
        Duration::from_millis(self.geo_timeout_ms)
    }
}
