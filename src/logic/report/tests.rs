use super::export::{to_jsonl, write_report};
use super::SessionReport;
use crate::logic::protocol::ProtocolLabel;
use crate::logic::record::DeltaRecord;
use crate::logic::testing::scripted_session;
use std::fs;
use tempfile::tempdir;

/// 24 ticks of steady traffic with one burst on tick 18
fn busy_session() -> crate::logic::session::MonitorSession {
    let mut ticks = Vec::new();
    let mut sent = 10_000u64;
    let mut recv = 20_000u64;
    for i in 0..24u64 {
        sent += if i == 18 { 9_000_000 } else { 1_200 + (i % 5) * 15 };
        recv += 2_400 + (i % 4) * 20;
        ticks.push(vec![("wlan0", sent, recv, Some("192.168.1.5"))]);
    }

    let (mut session, _) = scripted_session(ticks, &["wlan0"], 500);
    for _ in 0..24 {
        session.tick();
    }
    session
}

#[test]
fn test_report_summary() {
    let session = busy_session();
    let report = SessionReport::build(&session);

    assert_eq!(report.total_points, 24);
    assert_eq!(report.max_delta_bytes_sent, 9_000_000);
    assert_eq!(report.interfaces, vec!["wlan0".to_string()]);
    assert_eq!(report.protocol_distribution[&ProtocolLabel::Udp], 24);
    assert_eq!(report.top_ips[0].ip_address, "192.168.1.5");

    assert_eq!(report.detector.seed, 42);
    assert_eq!(report.detector.contamination, 0.05);

    let summary = report.anomaly_summary.expect("24 rows are enough to score");
    assert_eq!(summary.normal + summary.anomalous, 24);
    assert!(report.anomalies.iter().any(|r| r.delta_bytes_sent == 9_000_000));
    assert_eq!(report.anomalies.len(), summary.anomalous);
}

#[test]
fn test_empty_session_report() {
    let (session, _) = scripted_session(Vec::new(), &["wlan0"], 500);
    let report = SessionReport::build(&session);

    assert_eq!(report.total_points, 0);
    assert_eq!(report.max_delta_bytes_sent, 0);
    assert!(report.anomaly_summary.is_none());
    assert!(report.anomalies.is_empty());
}

#[test]
fn test_write_report_roundtrip() {
    let dir = tempdir().unwrap();
    let report = SessionReport::build(&busy_session());

    let path = write_report(&report, dir.path()).unwrap();
    assert!(path.extension().unwrap() == "json");

    let content = fs::read_to_string(&path).unwrap();
    let loaded: SessionReport = serde_json::from_str(&content).unwrap();
    assert_eq!(loaded.total_points, 24);
    assert_eq!(loaded.anomalies.len(), report.anomalies.len());
}

#[test]
fn test_history_jsonl() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("history.jsonl");
    let records = busy_session().history().snapshot();

    let written = to_jsonl(&records, &path).unwrap();
    assert_eq!(written, 24);

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 24);

    let first: DeltaRecord = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first, records[0]);
}
