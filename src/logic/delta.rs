//! Delta Tracker - Cumulative counters to per-interval deltas
//!
//! OS counters are cumulative since the interface came up. The tracker
//! remembers the last cumulative reading per interface and turns each new
//! reading into the bytes moved during the interval.

use std::collections::HashMap;
use chrono::{DateTime, Utc};

use super::sampler::InterfaceSample;

/// Last-seen sample per interface. Never shrinks except on [`reset`](Self::reset).
#[derive(Debug, Clone, Default)]
pub struct PreviousCounterState {
    entries: HashMap<String, InterfaceSample>,
}

impl PreviousCounterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, interface: &str) -> Option<&InterfaceSample> {
        self.entries.get(interface)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every interface; the next reading of each is a first observation
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    fn record(&mut self, sample: InterfaceSample) {
        self.entries.insert(sample.interface_name.clone(), sample);
    }
}

/// Bytes moved during one interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delta {
    pub sent: u64,
    pub recv: u64,
}

/// Compute the per-interval delta for `interface` and remember the reading.
///
/// A first observation yields `(0, 0)`. A counter that went backwards
/// (interface restart) yields 0 for that field only.
pub fn compute_delta(
    interface: &str,
    current_sent: u64,
    current_recv: u64,
    timestamp: DateTime<Utc>,
    previous: &mut PreviousCounterState,
) -> Delta {
    let delta = match previous.get(interface) {
        Some(prev) => Delta {
            sent: clamped_diff(interface, "sent", current_sent, prev.cumulative_bytes_sent),
            recv: clamped_diff(interface, "recv", current_recv, prev.cumulative_bytes_recv),
        },
        None => {
            log::debug!("First observation of {}, delta forced to 0", interface);
            Delta::default()
        }
    };

    previous.record(InterfaceSample {
        interface_name: interface.to_string(),
        timestamp,
        cumulative_bytes_sent: current_sent,
        cumulative_bytes_recv: current_recv,
    });

    delta
}

fn clamped_diff(interface: &str, field: &str, current: u64, previous: u64) -> u64 {
    match current.checked_sub(previous) {
        Some(diff) => diff,
        None => {
            log::debug!(
                "Counter reset on {} ({}): {} -> {}, delta clamped to 0",
                interface, field, previous, current
            );
            0
        }
    }
}
