//! Statistics - Descriptive views over a history snapshot
//!
//! Feeds the statistics page and the exported report.

use std::collections::{BTreeMap, HashMap};
use serde::{Deserialize, Serialize};

use super::anomaly::AnomalyVerdict;
use super::protocol::ProtocolLabel;
use super::record::DeltaRecord;

/// count / mean / std / min / max of one numeric column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); 0 with fewer than two values
    pub std: f64,
    pub min: u64,
    pub max: u64,
}

impl ColumnStats {
    pub fn from_values(values: &[u64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
        let std = if values.len() > 1 {
            let var = values.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / (n - 1.0);
            var.sqrt()
        } else {
            0.0
        };

        Self {
            count: values.len(),
            mean,
            std,
            min: values.iter().copied().min().unwrap_or(0),
            max: values.iter().copied().max().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub delta_bytes_sent: ColumnStats,
    pub delta_bytes_recv: ColumnStats,
    pub cumulative_bytes_sent: ColumnStats,
    pub cumulative_bytes_recv: ColumnStats,
}

/// Highest cumulative counters seen for one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpTraffic {
    pub ip_address: String,
    pub cumulative_bytes_sent: u64,
    pub cumulative_bytes_recv: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub normal: usize,
    pub anomalous: usize,
}

pub fn describe(records: &[DeltaRecord]) -> HistoryStats {
    HistoryStats {
        delta_bytes_sent: column(records, |r| r.delta_bytes_sent),
        delta_bytes_recv: column(records, |r| r.delta_bytes_recv),
        cumulative_bytes_sent: column(records, |r| r.cumulative_bytes_sent),
        cumulative_bytes_recv: column(records, |r| r.cumulative_bytes_recv),
    }
}

fn column(records: &[DeltaRecord], field: impl Fn(&DeltaRecord) -> u64) -> ColumnStats {
    let values: Vec<u64> = records.iter().map(field).collect();
    ColumnStats::from_values(&values)
}

/// Record count per protocol label, every label present (possibly 0)
pub fn protocol_distribution(records: &[DeltaRecord]) -> BTreeMap<ProtocolLabel, usize> {
    let mut counts: BTreeMap<ProtocolLabel, usize> =
        ProtocolLabel::ALL.iter().map(|&p| (p, 0)).collect();

    for record in records {
        *counts.entry(record.protocol_label).or_insert(0) += 1;
    }
    counts
}

/// Addresses ordered by their highest cumulative bytes sent, descending
pub fn top_ips(records: &[DeltaRecord], limit: usize) -> Vec<IpTraffic> {
    let mut by_ip: HashMap<String, (u64, u64)> = HashMap::new();

    for record in records {
        let entry = by_ip.entry(record.ip_display()).or_insert((0, 0));
        entry.0 = entry.0.max(record.cumulative_bytes_sent);
        entry.1 = entry.1.max(record.cumulative_bytes_recv);
    }

    let mut ranked: Vec<IpTraffic> = by_ip
        .into_iter()
        .map(|(ip_address, (sent, recv))| IpTraffic {
            ip_address,
            cumulative_bytes_sent: sent,
            cumulative_bytes_recv: recv,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.cumulative_bytes_sent
            .cmp(&a.cumulative_bytes_sent)
            .then_with(|| a.ip_address.cmp(&b.ip_address))
    });
    ranked.truncate(limit);
    ranked
}

pub fn summarize_verdicts(verdicts: &[AnomalyVerdict]) -> AnomalySummary {
    let anomalous = verdicts.iter().filter(|v| v.is_anomalous()).count();
    AnomalySummary {
        normal: verdicts.len() - anomalous,
        anomalous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(ip: Option<&str>, sent: u64, recv: u64, cum: (u64, u64), proto: ProtocolLabel) -> DeltaRecord {
        DeltaRecord {
            id: String::new(),
            timestamp: Utc::now(),
            interface_name: "wlan0".to_string(),
            ip_address: ip.map(|s| s.parse().unwrap()),
            location_label: "Unknown".to_string(),
            delta_bytes_sent: sent,
            delta_bytes_recv: recv,
            cumulative_bytes_sent: cum.0,
            cumulative_bytes_recv: cum.1,
            protocol_label: proto,
        }
    }

    #[test]
    fn test_column_stats() {
        let stats = ColumnStats::from_values(&[2, 4, 4, 4, 5, 5, 7, 9]);
        assert_eq!(stats.count, 8);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.min, 2);
        assert_eq!(stats.max, 9);
        assert!((stats.std - 2.138).abs() < 0.001);

        assert_eq!(ColumnStats::from_values(&[]), ColumnStats::default());
        assert_eq!(ColumnStats::from_values(&[3]).std, 0.0);
    }

    #[test]
    fn test_describe_columns() {
        let records = vec![
            record(None, 10, 100, (1_000, 2_000), ProtocolLabel::Tcp),
            record(None, 30, 300, (1_030, 2_300), ProtocolLabel::Tcp),
        ];
        let stats = describe(&records);

        assert_eq!(stats.delta_bytes_sent.mean, 20.0);
        assert_eq!(stats.delta_bytes_recv.max, 300);
        assert_eq!(stats.cumulative_bytes_recv.min, 2_000);
    }

    #[test]
    fn test_protocol_distribution() {
        let records = vec![
            record(None, 0, 0, (0, 0), ProtocolLabel::Tcp),
            record(None, 0, 0, (0, 0), ProtocolLabel::Udp),
            record(None, 0, 0, (0, 0), ProtocolLabel::Tcp),
        ];
        let dist = protocol_distribution(&records);

        assert_eq!(dist[&ProtocolLabel::Tcp], 2);
        assert_eq!(dist[&ProtocolLabel::Udp], 1);
        assert_eq!(dist[&ProtocolLabel::Icmp], 0);
        assert_eq!(dist.len(), 4);
    }

    #[test]
    fn test_top_ips() {
        let records = vec![
            record(Some("192.168.1.5"), 0, 0, (500, 10), ProtocolLabel::Tcp),
            record(Some("192.168.1.5"), 0, 0, (900, 20), ProtocolLabel::Tcp),
            record(Some("10.0.0.2"), 0, 0, (5_000, 1), ProtocolLabel::Tcp),
            record(None, 0, 0, (100, 100), ProtocolLabel::Tcp),
        ];
        let top = top_ips(&records, 2);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].ip_address, "10.0.0.2");
        assert_eq!(top[1].ip_address, "192.168.1.5");
        assert_eq!(top[1].cumulative_bytes_sent, 900);
        assert_eq!(top[1].cumulative_bytes_recv, 20);
    }

    #[test]
    fn test_summarize_verdicts() {
        let verdicts = [AnomalyVerdict::Normal, AnomalyVerdict::Anomalous, AnomalyVerdict::Normal];
        assert_eq!(summarize_verdicts(&verdicts), AnomalySummary { normal: 2, anomalous: 1 });
    }
}
