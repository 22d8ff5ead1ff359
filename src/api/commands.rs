//! Dashboard Commands - Read-only views for display, charts and export
//!
//! Consumers never touch the session state directly: every command returns
//! owned, serializable data built from a snapshot.

use std::collections::BTreeMap;
use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::constants::{RECENT_ANOMALY_WINDOW, TOP_IP_LIMIT};
use crate::logic::protocol::ProtocolLabel;
use crate::logic::record::DeltaRecord;
use crate::logic::report::{export, SessionReport};
use crate::logic::sampler::is_wireless_name;
use crate::logic::session::MonitorSession;
use crate::logic::statistics::{self, AnomalySummary, HistoryStats, IpTraffic};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorStatus {
    pub interfaces: Vec<String>,
    pub tick_count: u64,
    pub history_len: usize,
    pub history_cap: usize,
    pub started_at: String,
    pub last_sample_at: Option<String>,
}

/// One history row, formatted for tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRow {
    pub id: String,
    pub timestamp: String,
    pub interface: String,
    pub ip_address: String,
    pub location: String,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub cum_bytes_sent: u64,
    pub cum_bytes_recv: u64,
    pub protocol: String,
}

impl From<&DeltaRecord> for HistoryRow {
    fn from(r: &DeltaRecord) -> Self {
        Self {
            id: r.id.clone(),
            timestamp: r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            interface: r.interface_name.clone(),
            ip_address: r.ip_display(),
            location: r.location_label.clone(),
            bytes_sent: r.delta_bytes_sent,
            bytes_recv: r.delta_bytes_recv,
            cum_bytes_sent: r.cumulative_bytes_sent,
            cum_bytes_recv: r.cumulative_bytes_recv,
            protocol: r.protocol_label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyView {
    /// false = not enough (or degenerate) data, not "zero anomalies"
    pub available: bool,
    pub summary: Option<AnomalySummary>,
    /// Anomalous rows among the most recent records
    pub recent: Vec<HistoryRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsView {
    pub stats: HistoryStats,
    pub protocol_distribution: BTreeMap<ProtocolLabel, usize>,
    pub top_ips: Vec<IpTraffic>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceOption {
    pub name: String,
    pub selected: bool,
    pub wireless: bool,
}

// ============================================================================
// STATUS & HISTORY
// ============================================================================

pub fn get_monitor_status(session: &MonitorSession) -> MonitorStatus {
    let history = session.history();

    MonitorStatus {
        interfaces: session.interfaces().to_vec(),
        tick_count: session.tick_count(),
        history_len: history.len(),
        history_cap: history.cap(),
        started_at: session.started_at().to_rfc3339(),
        last_sample_at: history.iter().last().map(|r| r.timestamp.to_rfc3339()),
    }
}

/// Most recent `limit` rows, oldest first
pub fn get_recent_history(session: &MonitorSession, limit: usize) -> Vec<HistoryRow> {
    session.history().tail(limit).iter().map(HistoryRow::from).collect()
}

// ============================================================================
// ANALYSIS
// ============================================================================

pub fn get_anomalies(session: &MonitorSession) -> AnomalyView {
    let Some(verdicts) = session.score_history() else {
        return AnomalyView { available: false, summary: None, recent: Vec::new() };
    };

    let recent = session
        .recent_anomalies(RECENT_ANOMALY_WINDOW)
        .unwrap_or_default()
        .iter()
        .map(HistoryRow::from)
        .collect();

    AnomalyView {
        available: true,
        summary: Some(statistics::summarize_verdicts(&verdicts)),
        recent,
    }
}

pub fn get_statistics(session: &MonitorSession) -> StatisticsView {
    let records = session.history().snapshot();

    StatisticsView {
        stats: statistics::describe(&records),
        protocol_distribution: statistics::protocol_distribution(&records),
        top_ips: statistics::top_ips(&records, TOP_IP_LIMIT),
    }
}

// ============================================================================
// INTERFACE SELECTION
// ============================================================================

pub fn list_interfaces(session: &mut MonitorSession) -> Vec<InterfaceOption> {
    let selected = session.interfaces().to_vec();

    session
        .available_interfaces()
        .into_iter()
        .map(|name| InterfaceOption {
            selected: selected.contains(&name),
            wireless: is_wireless_name(&name),
            name,
        })
        .collect()
}

pub fn select_interfaces(session: &mut MonitorSession, names: Vec<String>) -> Result<Vec<String>, String> {
    if names.iter().all(|n| n.trim().is_empty()) {
        return Err("Please select at least one interface".to_string());
    }

    let names: Vec<String> = names.into_iter().filter(|n| !n.trim().is_empty()).collect();
    session.set_interfaces(names.clone());
    log::info!("Monitoring interfaces: {:?}", names);
    Ok(names)
}

// ============================================================================
// EXPORT
// ============================================================================

pub fn export_report(session: &MonitorSession, dir: &Path) -> Result<String, String> {
    let report = SessionReport::build(session);
    export::write_report(&report, dir)
        .map(|path| path.display().to_string())
        .map_err(|e| e.to_string())
}

pub fn export_history_jsonl(session: &MonitorSession, target: &Path) -> Result<usize, String> {
    export::to_jsonl(&session.history().snapshot(), target).map_err(|e| e.to_string())
}
