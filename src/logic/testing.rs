//! Test doubles for the session collaborators

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::geo::{GeoLocator, UNKNOWN};
use super::protocol::{ProtocolLabel, ProtocolLabeler};
use super::sampler::{CounterSource, InterfaceCounters};
use super::session::MonitorSession;

/// (interface, cumulative sent, cumulative recv, address)
pub type Reading<'a> = (&'a str, u64, u64, Option<&'a str>);

/// Replays one scripted counter map per tick
pub struct ScriptedSource {
    ticks: VecDeque<HashMap<String, InterfaceCounters>>,
}

impl ScriptedSource {
    pub fn new(ticks: Vec<Vec<Reading<'_>>>) -> Self {
        let ticks = ticks
            .into_iter()
            .map(|entries| {
                entries
                    .into_iter()
                    .map(|(name, sent, recv, ip)| {
                        let addresses: Vec<IpAddr> =
                            ip.into_iter().map(|s| s.parse().unwrap()).collect();
                        (
                            name.to_string(),
                            InterfaceCounters {
                                name: name.to_string(),
                                cumulative_bytes_sent: sent,
                                cumulative_bytes_recv: recv,
                                addresses,
                            },
                        )
                    })
                    .collect()
            })
            .collect();
        Self { ticks }
    }
}

impl CounterSource for ScriptedSource {
    fn sample(&mut self) -> HashMap<String, InterfaceCounters> {
        self.ticks.pop_front().unwrap_or_default()
    }
}

/// Canned labels, counts calls
pub struct FakeGeo {
    pub calls: Arc<AtomicUsize>,
}

impl GeoLocator for FakeGeo {
    fn locate(&self, ip: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match ip {
            "8.8.8.8" => "Mountain View, California, US".to_string(),
            "192.168.1.5" => "Private Network".to_string(),
            _ => UNKNOWN.to_string(),
        }
    }
}

pub struct FixedLabeler(pub ProtocolLabel);

impl ProtocolLabeler for FixedLabeler {
    fn label(&mut self, _interface: &str) -> ProtocolLabel {
        self.0
    }
}

/// Session over scripted readings; returns the geo call counter too
pub fn scripted_session(
    ticks: Vec<Vec<Reading<'_>>>,
    interfaces: &[&str],
    cap: usize,
) -> (MonitorSession, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let session = MonitorSession::new(
        Box::new(ScriptedSource::new(ticks)),
        Box::new(FakeGeo { calls: calls.clone() }),
        Box::new(FixedLabeler(ProtocolLabel::Udp)),
        cap,
    )
    .with_interfaces(interfaces.iter().map(|s| s.to_string()).collect());
    (session, calls)
}
