//! Anomaly Scorer - Unsupervised outlier flagging over traffic deltas
//!
//! Fits an isolation forest on `(bytes_sent, bytes_recv)` points and labels
//! every row NORMAL or ANOMALOUS. Raw byte counts are used as-is, without
//! scaling, so large-magnitude rows dominate the geometry.
//!
//! The scorer keeps no memory between calls: each call is a fresh fit over
//! exactly the rows given, with a fixed seed.

pub mod coerce;
pub mod forest;


use std::fmt;
use serde::{Deserialize, Serialize};

pub use coerce::TrafficRow;
use forest::{contamination_offset, to_matrix, IsolationForest};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Expected share of outliers, in (0, 0.5]
    pub contamination: f64,

    /// RNG seed; identical input + seed gives identical verdicts
    pub seed: u64,

    pub n_trees: usize,

    /// Upper bound of the per-tree sub-sample
    pub max_samples: usize,

    /// Below this many rows no model is fitted
    pub min_rows: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            contamination: 0.05,
            seed: 42,
            n_trees: 100,
            max_samples: 256,
            min_rows: 10,
        }
    }
}

// ============================================================================
// RESULT TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnomalyVerdict {
    Normal,
    Anomalous,
}

impl AnomalyVerdict {
    pub fn is_anomalous(&self) -> bool {
        matches!(self, AnomalyVerdict::Anomalous)
    }
}

impl fmt::Display for AnomalyVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyVerdict::Normal => write!(f, "NORMAL"),
            AnomalyVerdict::Anomalous => write!(f, "ANOMALOUS"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScoreError {
    /// Not enough rows for a meaningful decision
    InsufficientData { rows: usize, required: usize },
    /// Model could not be fitted on this batch
    DegenerateInput { reason: String },
    /// Detector configuration out of range
    InvalidConfig { reason: String },
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::InsufficientData { rows, required } =>
                write!(f, "Insufficient data: {} rows, need at least {}", rows, required),
            ScoreError::DegenerateInput { reason } => write!(f, "Degenerate input: {}", reason),
            ScoreError::InvalidConfig { reason } => write!(f, "Invalid detector config: {}", reason),
        }
    }
}

impl std::error::Error for ScoreError {}

// ============================================================================
// SCORER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AnomalyScorer {
    config: DetectorConfig,
}

impl AnomalyScorer {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// One verdict per row, or `None` when no verdict can be given
    pub fn score(&self, rows: Option<&[TrafficRow]>) -> Option<Vec<AnomalyVerdict>> {
        let rows = rows?;
        match self.try_score(rows) {
            Ok(verdicts) => Some(verdicts),
            Err(e) => {
                log::debug!("Anomaly scoring skipped: {}", e);
                None
            }
        }
    }

    /// Same as [`score`](Self::score) but keeps the reason for a missing result
    pub fn try_score(&self, rows: &[TrafficRow]) -> Result<Vec<AnomalyVerdict>, ScoreError> {
        self.validate()?;

        if rows.len() < self.config.min_rows {
            return Err(ScoreError::InsufficientData {
                rows: rows.len(),
                required: self.config.min_rows,
            });
        }

        let points: Vec<[f64; 2]> = rows.iter().map(TrafficRow::coerced).collect();
        let data = to_matrix(&points)?;

        let forest = IsolationForest::fit(data.view(), &self.config)?;
        let scores = forest.score_samples(data.view());
        let offset = contamination_offset(&scores, self.config.contamination);

        let verdicts: Vec<AnomalyVerdict> = scores
            .iter()
            .map(|&s| if s < offset { AnomalyVerdict::Anomalous } else { AnomalyVerdict::Normal })
            .collect();

        log::debug!(
            "Scored {} rows: {} anomalous (offset {:.4})",
            verdicts.len(),
            verdicts.iter().filter(|v| v.is_anomalous()).count(),
            offset
        );

        Ok(verdicts)
    }

    fn validate(&self) -> Result<(), ScoreError> {
        let c = self.config.contamination;
        if !(c > 0.0 && c <= 0.5) {
            return Err(ScoreError::InvalidConfig {
                reason: format!("contamination {} outside (0, 0.5]", c),
            });
        }
        if self.config.n_trees == 0 || self.config.max_samples < 2 {
            return Err(ScoreError::InvalidConfig {
                reason: "need at least one tree and a sub-sample of two".to_string(),
            });
        }
        Ok(())
    }
}
