//! Monitor Session - Owns all per-session state and runs the tick pipeline
//!
//! Flow (one tick):
//! 1. Read cumulative counters for every interface
//! 2. Skip selected interfaces that reported nothing this tick
//! 3. Delta against the previous reading, location + protocol label
//! 4. Append the batch to the bounded history
//!
//! Scoring runs on demand over the current history. The session is the
//! single writer of `PreviousCounterState` and `History`; readers only get
//! owned snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::anomaly::{AnomalyScorer, AnomalyVerdict, DetectorConfig, TrafficRow};
use super::config::MonitorConfig;
use super::delta::{compute_delta, PreviousCounterState};
use super::geo::{GeoLocator, IpInfoLocator, OfflineLocator, UNKNOWN};
use super::history::History;
use super::protocol::{ProtocolLabeler, RandomProtocolLabeler};
use super::record::DeltaRecord;
use super::sampler::{default_interfaces, list_interfaces, CounterSource, SysinfoSource};

/// Outcome of one tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub timestamp: DateTime<Utc>,
    pub records_appended: usize,
    /// Selected interfaces with no stats this tick
    pub skipped: Vec<String>,
    pub history_len: usize,
}

pub struct MonitorSession {
    source: Box<dyn CounterSource>,
    geo: Box<dyn GeoLocator>,
    labeler: Box<dyn ProtocolLabeler>,
    scorer: AnomalyScorer,

    previous: PreviousCounterState,
    history: History,

    interfaces: Vec<String>,
    started_at: DateTime<Utc>,
    ticks: u64,
}

impl MonitorSession {
    pub fn new(
        source: Box<dyn CounterSource>,
        geo: Box<dyn GeoLocator>,
        labeler: Box<dyn ProtocolLabeler>,
        history_cap: usize,
    ) -> Self {
        Self {
            source,
            geo,
            labeler,
            scorer: AnomalyScorer::new(DetectorConfig::default()),
            previous: PreviousCounterState::new(),
            history: History::with_cap(history_cap),
            interfaces: Vec::new(),
            started_at: Utc::now(),
            ticks: 0,
        }
    }

    /// Production wiring: OS counters, ipinfo.io lookups, placeholder protocol labels.
    /// Interfaces start from the wireless heuristic.
    pub fn from_config(config: &MonitorConfig) -> Self {
        let geo: Box<dyn GeoLocator> = if config.geo_enabled {
            Box::new(IpInfoLocator::new(config.geo_timeout()))
        } else {
            Box::new(OfflineLocator)
        };

        let mut session = Self::new(
            Box::new(SysinfoSource::new()),
            geo,
            Box::new(RandomProtocolLabeler::new()),
            config.history_cap,
        )
        .with_scorer(AnomalyScorer::new(config.detector.clone()));

        let all = session.source.interface_names();
        session.interfaces = default_interfaces(&all);

        log::info!(
            "Monitor session created: interfaces={:?}, history_cap={}, geo={}",
            session.interfaces,
            config.history_cap,
            if config.geo_enabled { "ipinfo" } else { "offline" }
        );

        session
    }

    pub fn with_scorer(mut self, scorer: AnomalyScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_interfaces(mut self, interfaces: Vec<String>) -> Self {
        self.interfaces = interfaces;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn set_interfaces(&mut self, interfaces: Vec<String>) {
        self.interfaces = interfaces;
    }

    /// Every interface the OS currently reports
    pub fn available_interfaces(&mut self) -> Vec<String> {
        list_interfaces(self.source.as_mut())
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn previous_counters(&self) -> &PreviousCounterState {
        &self.previous
    }

    pub fn scorer(&self) -> &AnomalyScorer {
        &self.scorer
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Drop history and counter memory, keep collaborators and selection
    pub fn reset(&mut self) {
        self.previous.reset();
        self.history.clear();
        self.ticks = 0;
        self.started_at = Utc::now();
        log::info!("Monitor session reset");
    }

    // ------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------

    /// Sample, compute deltas, append to history
    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;

        let counters = self.source.sample();
        let timestamp = Utc::now();

        let mut batch = Vec::with_capacity(self.interfaces.len());
        let mut skipped = Vec::new();

        for iface in &self.interfaces {
            let Some(stats) = counters.get(iface) else {
                log::debug!("No stats for {} this tick, skipping", iface);
                skipped.push(iface.clone());
                continue;
            };

            let ip = stats.ipv4();
            let location_label = match ip {
                Some(addr) => self.geo.locate(&addr.to_string()),
                None => UNKNOWN.to_string(),
            };
            let protocol_label = self.labeler.label(iface);

            let delta = compute_delta(
                iface,
                stats.cumulative_bytes_sent,
                stats.cumulative_bytes_recv,
                timestamp,
                &mut self.previous,
            );

            batch.push(DeltaRecord {
                id: Uuid::new_v4().to_string(),
                timestamp,
                interface_name: iface.clone(),
                ip_address: ip.map(Into::into),
                location_label,
                delta_bytes_sent: delta.sent,
                delta_bytes_recv: delta.recv,
                cumulative_bytes_sent: stats.cumulative_bytes_sent,
                cumulative_bytes_recv: stats.cumulative_bytes_recv,
                protocol_label,
            });
        }

        let records_appended = batch.len();
        self.history.append(batch);

        log::debug!(
            "Tick {}: {} records, {} skipped, history={}",
            self.ticks,
            records_appended,
            skipped.len(),
            self.history.len()
        );

        TickReport {
            tick: self.ticks,
            timestamp,
            records_appended,
            skipped,
            history_len: self.history.len(),
        }
    }

    /// Verdicts for the whole history, aligned with [`History::snapshot`]
    pub fn score_history(&self) -> Option<Vec<AnomalyVerdict>> {
        let rows: Vec<TrafficRow> = self.history.iter().map(TrafficRow::from).collect();
        self.scorer.score(Some(rows.as_slice()))
    }

    /// Snapshot paired with verdicts; `None` when no verdicts are available
    pub fn scored_snapshot(&self) -> Option<Vec<(DeltaRecord, AnomalyVerdict)>> {
        let verdicts = self.score_history()?;
        Some(self.history.snapshot().into_iter().zip(verdicts).collect())
    }

    /// Anomalous records among the `window` most recent ones
    pub fn recent_anomalies(&self, window: usize) -> Option<Vec<DeltaRecord>> {
        let recent = self.history.tail(window);
        let rows: Vec<TrafficRow> = recent.iter().map(TrafficRow::from).collect();
        let verdicts = self.scorer.score(Some(rows.as_slice()))?;

        Some(
            recent
                .into_iter()
                .zip(verdicts)
                .filter(|(_, v)| v.is_anomalous())
                .map(|(record, _)| record)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use crate::logic::protocol::ProtocolLabel;
    use crate::logic::testing::scripted_session as session;

    #[test]
    fn test_first_tick_records_zero_deltas() {
        let (mut s, _) = session(
            vec![vec![("wlan0", 5_000, 9_000, Some("192.168.1.5"))]],
            &["wlan0"],
            500,
        );

        let report = s.tick();
        assert_eq!(report.records_appended, 1);

        let rec = &s.history().snapshot()[0];
        assert_eq!((rec.delta_bytes_sent, rec.delta_bytes_recv), (0, 0));
        assert_eq!((rec.cumulative_bytes_sent, rec.cumulative_bytes_recv), (5_000, 9_000));
        assert_eq!(rec.location_label, "Private Network");
        assert_eq!(rec.ip_display(), "192.168.1.5");
        assert_eq!(rec.protocol_label, ProtocolLabel::Udp);
    }

    #[test]
    fn test_deltas_across_ticks_with_reset() {
        let (mut s, _) = session(
            vec![
                vec![("eth0", 1_000, 2_000, None)],
                vec![("eth0", 1_500, 1_800, None)],
                vec![("eth0", 1_700, 2_000, None)],
            ],
            &["eth0"],
            500,
        );

        s.tick();
        s.tick();
        s.tick();

        let deltas: Vec<(u64, u64)> = s
            .history()
            .iter()
            .map(|r| (r.delta_bytes_sent, r.delta_bytes_recv))
            .collect();
        assert_eq!(deltas, vec![(0, 0), (500, 0), (200, 200)]);

        let prev = s.previous_counters().get("eth0").unwrap();
        assert_eq!((prev.cumulative_bytes_sent, prev.cumulative_bytes_recv), (1_700, 2_000));
    }

    #[test]
    fn test_missing_interface_is_skipped_only_this_tick() {
        let (mut s, _) = session(
            vec![
                vec![("wlan0", 100, 100, None), ("eth0", 10, 10, None)],
                vec![("eth0", 20, 30, None)],
                vec![("wlan0", 400, 250, None), ("eth0", 25, 30, None)],
            ],
            &["wlan0", "eth0"],
            500,
        );

        s.tick();
        let report = s.tick();
        assert_eq!(report.skipped, vec!["wlan0".to_string()]);
        assert_eq!(report.records_appended, 1);

        s.tick();
        let snapshot = s.history().snapshot();
        assert_eq!(snapshot.len(), 5);

        let wlan_last = snapshot.iter().rev().find(|r| r.interface_name == "wlan0").unwrap();
        assert_eq!((wlan_last.delta_bytes_sent, wlan_last.delta_bytes_recv), (300, 150));

        let eth_last = snapshot.last().unwrap();
        assert_eq!(eth_last.interface_name, "eth0");
        assert_eq!((eth_last.delta_bytes_sent, eth_last.delta_bytes_recv), (5, 0));
    }

    #[test]
    fn test_no_ipv4_means_no_lookup() {
        let (mut s, calls) = session(
            vec![vec![("wlan0", 1, 1, Some("fe80::1")), ("eth0", 1, 1, Some("8.8.8.8"))]],
            &["wlan0", "eth0"],
            500,
        );

        s.tick();
        let snapshot = s.history().snapshot();

        assert_eq!(snapshot[0].ip_display(), "N/A");
        assert_eq!(snapshot[0].location_label, UNKNOWN);
        assert_eq!(snapshot[1].location_label, "Mountain View, California, US");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_lookup_keeps_sample() {
        let (mut s, _) = session(
            vec![vec![("wlan0", 1, 1, Some("1.1.1.1"))]],
            &["wlan0"],
            500,
        );

        let report = s.tick();
        assert_eq!(report.records_appended, 1);
        assert_eq!(s.history().snapshot()[0].location_label, UNKNOWN);
    }

    #[test]
    fn test_history_cap_over_ticks() {
        let ticks = (1..=30u64).map(|i| vec![("wlan0", i * 100, i * 50, None)]).collect();
        let (mut s, _) = session(ticks, &["wlan0"], 20);

        for _ in 0..30 {
            s.tick();
        }

        let snapshot = s.history().snapshot();
        assert_eq!(snapshot.len(), 20);
        assert_eq!(snapshot[0].cumulative_bytes_sent, 1_100);
        assert_eq!(snapshot[19].cumulative_bytes_sent, 3_000);
    }

    #[test]
    fn test_scoring_needs_ten_rows() {
        let ticks = (0..12u64).map(|i| vec![("wlan0", i * 1_000 + i * i, i * 700, None)]).collect();
        let (mut s, _) = session(ticks, &["wlan0"], 500);

        for _ in 0..9 {
            s.tick();
        }
        assert!(s.score_history().is_none());

        s.tick();
        s.tick();
        let verdicts = s.score_history().unwrap();
        assert_eq!(verdicts.len(), s.history().len());
    }

    #[test]
    fn test_recent_anomalies_finds_spike() {
        let mut ticks = Vec::new();
        let mut sent = 0u64;
        for i in 0..25u64 {
            sent += if i == 20 { 5_000_000 } else { 1_000 + (i % 3) * 10 };
            ticks.push(vec![("wlan0", sent, sent / 2, None)]);
        }
        let (mut s, _) = session(ticks, &["wlan0"], 500);
        for _ in 0..25 {
            s.tick();
        }

        let anomalies = s.recent_anomalies(200).unwrap();
        assert!(anomalies.iter().any(|r| r.delta_bytes_sent == 5_000_000));
    }

    #[test]
    fn test_scored_snapshot_uses_session_scorer() {
        let mut ticks = Vec::new();
        let mut sent = 0u64;
        for i in 0..20u64 {
            sent += if i == 15 { 4_000_000 } else { 900 + (i % 4) * 12 };
            ticks.push(vec![("wlan0", sent, sent / 3, None)]);
        }
        let scorer = AnomalyScorer::new(DetectorConfig {
            contamination: 0.1,
            ..Default::default()
        });
        let (s, _) = session(ticks, &["wlan0"], 500);
        let mut s = s.with_scorer(scorer);
        for _ in 0..20 {
            s.tick();
        }

        assert_eq!(s.scorer().config().contamination, 0.1);

        let scored = s.scored_snapshot().unwrap();
        assert_eq!(scored.len(), 20);
        assert_eq!(scored[15].0.delta_bytes_sent, 4_000_000);
        assert_eq!(scored[15].1, AnomalyVerdict::Anomalous);

        let verdicts: Vec<AnomalyVerdict> = scored.iter().map(|(_, v)| *v).collect();
        assert_eq!(Some(verdicts), s.score_history());
    }

    #[test]
    fn test_scored_snapshot_none_when_too_small() {
        let (mut s, _) = session(vec![vec![("wlan0", 1, 1, None)]], &["wlan0"], 500);
        s.tick();
        assert!(s.scored_snapshot().is_none());
    }

    #[test]
    fn test_reset_clears_state() {
        let (mut s, _) = session(
            vec![vec![("wlan0", 1, 1, None)], vec![("wlan0", 9, 9, None)]],
            &["wlan0"],
            500,
        );
        s.tick();
        s.reset();

        assert!(s.history().is_empty());
        assert!(s.previous_counters().is_empty());

        s.tick();
        let rec = &s.history().snapshot()[0];
        assert_eq!((rec.delta_bytes_sent, rec.delta_bytes_recv), (0, 0));
    }
}
