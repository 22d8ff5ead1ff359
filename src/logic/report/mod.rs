//! Report Module - Session summary for export
//!
//! Gathers statistics, protocol mix, top addresses and anomalies from a
//! session snapshot into one serializable document.

pub mod export;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{APP_NAME, APP_VERSION, TOP_IP_LIMIT};
use crate::logic::anomaly::{AnomalyVerdict, DetectorConfig};
use crate::logic::protocol::ProtocolLabel;
use crate::logic::record::DeltaRecord;
use crate::logic::session::MonitorSession;
use crate::logic::statistics::{self, AnomalySummary, HistoryStats, IpTraffic};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub title: String,
    pub app_version: String,
    pub host: String,
    pub generated_at: DateTime<Utc>,
    pub session_started_at: DateTime<Utc>,
    pub interfaces: Vec<String>,
    pub detector: DetectorConfig,

    // Summary
    pub total_points: usize,
    pub max_delta_bytes_sent: u64,
    pub max_delta_bytes_recv: u64,

    pub stats: HistoryStats,
    pub protocol_distribution: BTreeMap<ProtocolLabel, usize>,
    pub top_ips: Vec<IpTraffic>,

    /// `None` when the history was too small or degenerate to score
    pub anomaly_summary: Option<AnomalySummary>,
    pub anomalies: Vec<DeltaRecord>,
}

impl SessionReport {
    pub fn build(session: &MonitorSession) -> Self {
        let records = session.history().snapshot();
        let scored = session.scored_snapshot();

        let verdicts: Option<Vec<AnomalyVerdict>> =
            scored.as_ref().map(|pairs| pairs.iter().map(|(_, v)| *v).collect());
        let anomalies = scored
            .unwrap_or_default()
            .into_iter()
            .filter(|(_, verdict)| verdict.is_anomalous())
            .map(|(record, _)| record)
            .collect();

        let stats = statistics::describe(&records);

        Self {
            title: format!("{} Network Anomaly and Statistics Report", APP_NAME),
            app_version: APP_VERSION.to_string(),
            host: host_name(),
            generated_at: Utc::now(),
            session_started_at: session.started_at(),
            interfaces: session.interfaces().to_vec(),
            detector: session.scorer().config().clone(),
            total_points: records.len(),
            max_delta_bytes_sent: stats.delta_bytes_sent.max,
            max_delta_bytes_recv: stats.delta_bytes_recv.max,
            protocol_distribution: statistics::protocol_distribution(&records),
            top_ips: statistics::top_ips(&records, TOP_IP_LIMIT),
            anomaly_summary: verdicts.as_deref().map(statistics::summarize_verdicts),
            anomalies,
            stats,
        }
    }
}

fn host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown-host".to_string())
}
