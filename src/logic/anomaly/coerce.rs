//! Numeric coercion for scorer input
//!
//! Scorer rows may come from loosely typed sources (CSV cells, JSON, text
//! inputs). Anything that does not read as a finite number becomes 0.

use serde::{Deserialize, Serialize};

use crate::logic::record::DeltaRecord;

/// A single raw cell before coercion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Int(u64),
    Float(f64),
    Text(String),
    Missing,
}

impl From<u64> for RawValue {
    fn from(v: u64) -> Self {
        RawValue::Int(v)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(RawValue::Missing)
    }
}

/// One scorer input row: per-interval sent / received bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficRow {
    pub bytes_sent: RawValue,
    pub bytes_recv: RawValue,
}

impl TrafficRow {
    pub fn new(bytes_sent: impl Into<RawValue>, bytes_recv: impl Into<RawValue>) -> Self {
        Self {
            bytes_sent: bytes_sent.into(),
            bytes_recv: bytes_recv.into(),
        }
    }

    /// Both features as numbers
    pub fn coerced(&self) -> [f64; 2] {
        [coerce_numeric(&self.bytes_sent), coerce_numeric(&self.bytes_recv)]
    }
}

impl From<&DeltaRecord> for TrafficRow {
    fn from(record: &DeltaRecord) -> Self {
        TrafficRow::new(record.delta_bytes_sent, record.delta_bytes_recv)
    }
}

/// Interpret a raw cell as a number; unparsable, missing or non-finite → 0
pub fn coerce_numeric(value: &RawValue) -> f64 {
    let parsed = match value {
        RawValue::Int(v) => *v as f64,
        RawValue::Float(v) => *v,
        RawValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        RawValue::Missing => 0.0,
    };

    if parsed.is_finite() { parsed } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(coerce_numeric(&RawValue::Int(42)), 42.0);
        assert_eq!(coerce_numeric(&RawValue::Float(1.5)), 1.5);
        assert_eq!(coerce_numeric(&RawValue::from(" 1024 ")), 1024.0);
        assert_eq!(coerce_numeric(&RawValue::from("3.25")), 3.25);
    }

    #[test]
    fn test_garbage_becomes_zero() {
        assert_eq!(coerce_numeric(&RawValue::from("n/a")), 0.0);
        assert_eq!(coerce_numeric(&RawValue::from("")), 0.0);
        assert_eq!(coerce_numeric(&RawValue::Missing), 0.0);
        assert_eq!(coerce_numeric(&RawValue::Float(f64::NAN)), 0.0);
        assert_eq!(coerce_numeric(&RawValue::Float(f64::INFINITY)), 0.0);
        assert_eq!(coerce_numeric(&RawValue::from("inf")), 0.0);
        assert_eq!(coerce_numeric(&RawValue::from(None::<u64>)), 0.0);
    }

    #[test]
    fn test_untagged_json_rows() {
        let rows: Vec<TrafficRow> = serde_json::from_str(
            r#"[{"bytes_sent": 10, "bytes_recv": "20"}, {"bytes_sent": "x", "bytes_recv": null}]"#,
        )
        .unwrap();

        assert_eq!(rows[0].coerced(), [10.0, 20.0]);
        assert_eq!(rows[1].coerced(), [0.0, 0.0]);
    }
}
