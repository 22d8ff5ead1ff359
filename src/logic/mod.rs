//! Logic Module - Sampling, delta tracking and anomaly scoring
//!
//! ## Pipeline
//! - `sampler` - OS counters per interface
//! - `delta` - cumulative counters to per-interval deltas
//! - `history` - bounded record window
//! - `anomaly/` - isolation forest scorer
//! - `session` - owns the state above and runs one tick

pub mod anomaly;
pub mod config;
pub mod delta;
pub mod geo;
pub mod history;
pub mod protocol;
pub mod record;
pub mod report;
pub mod sampler;
pub mod session;
pub mod statistics;

#[cfg(test)]
pub(crate) mod testing;
