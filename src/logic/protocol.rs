//! Protocol Labels
//!
//! Interface counters carry no per-protocol breakdown, so the shipped
//! labeler is a placeholder that draws a label uniformly at random. It is
//! kept behind [`ProtocolLabeler`] so real packet accounting can replace it
//! without touching the rest of the pipeline.

use std::fmt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProtocolLabel {
    Tcp,
    Udp,
    Icmp,
    Other,
}

impl ProtocolLabel {
    pub const ALL: [ProtocolLabel; 4] = [
        ProtocolLabel::Tcp,
        ProtocolLabel::Udp,
        ProtocolLabel::Icmp,
        ProtocolLabel::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolLabel::Tcp => "TCP",
            ProtocolLabel::Udp => "UDP",
            ProtocolLabel::Icmp => "ICMP",
            ProtocolLabel::Other => "OTHER",
        }
    }
}

impl fmt::Display for ProtocolLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assigns a protocol label to each delta record
pub trait ProtocolLabeler: Send {
    fn label(&mut self, interface: &str) -> ProtocolLabel;
}

/// Placeholder labeler: uniform random choice, no packet inspection
pub struct RandomProtocolLabeler {
    rng: StdRng,
}

impl RandomProtocolLabeler {
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Reproducible sequence of labels
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for RandomProtocolLabeler {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolLabeler for RandomProtocolLabeler {
    fn label(&mut self, _interface: &str) -> ProtocolLabel {
        ProtocolLabel::ALL[self.rng.gen_range(0..ProtocolLabel::ALL.len())]
    }
}
