//! Isolation Forest
//!
//! Each tree recursively splits a random sub-sample on a random feature at a
//! uniformly drawn threshold. Outliers get isolated close to the root, so a
//! short average path length means "anomalous".

use ndarray::{Array1, Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{seq::index, Rng, SeedableRng};

use super::{DetectorConfig, ScoreError};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

pub struct IsolationForest {
    trees: Vec<Node>,
    sample_size: usize,
}

impl IsolationForest {
    /// Grow the forest over `data` (rows = points, columns = features)
    pub fn fit(data: ArrayView2<'_, f64>, config: &DetectorConfig) -> Result<Self, ScoreError> {
        let (n_rows, n_features) = data.dim();

        if n_rows < 2 || n_features == 0 {
            return Err(ScoreError::DegenerateInput {
                reason: format!("{} rows x {} features", n_rows, n_features),
            });
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(ScoreError::DegenerateInput {
                reason: "non-finite value in feature matrix".to_string(),
            });
        }
        if (0..n_features).any(|f| column_range(data, f, None).is_some_and(|(lo, hi)| !(hi - lo).is_finite())) {
            return Err(ScoreError::DegenerateInput {
                reason: "feature range overflows f64".to_string(),
            });
        }
        if (0..n_features).all(|f| column_range(data, f, None).is_none()) {
            return Err(ScoreError::DegenerateInput {
                reason: "no feature has any variance".to_string(),
            });
        }

        let sample_size = config.max_samples.min(n_rows).max(2);
        let max_depth = (sample_size as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(config.seed);

        let trees = (0..config.n_trees)
            .map(|_| {
                let rows = index::sample(&mut rng, n_rows, sample_size).into_vec();
                grow(data, rows, 0, max_depth, &mut rng)
            })
            .collect();

        Ok(Self { trees, sample_size })
    }

    /// Opposite of the anomaly score: the lower, the more abnormal.
    ///
    /// Values lie in `[-1, 0)`; inliers sit around -0.5 or above.
    pub fn score_samples(&self, data: ArrayView2<'_, f64>) -> Array1<f64> {
        let norm = average_path_length(self.sample_size);
        let n_trees = self.trees.len().max(1) as f64;

        data.rows()
            .into_iter()
            .map(|row| {
                let point = row.to_vec();
                let total: f64 = self.trees.iter().map(|tree| path_length(tree, &point)).sum();
                let mean_depth = total / n_trees;
                -(2f64.powf(-mean_depth / norm))
            })
            .collect()
    }
}

/// Build the feature matrix for a batch of `[sent, recv]` points
pub fn to_matrix(points: &[[f64; 2]]) -> Result<Array2<f64>, ScoreError> {
    let flat: Vec<f64> = points.iter().flat_map(|p| p.iter().copied()).collect();
    Array2::from_shape_vec((points.len(), 2), flat).map_err(|e| ScoreError::DegenerateInput {
        reason: e.to_string(),
    })
}

/// Score threshold for a given contamination, numpy-style linear percentile
pub fn contamination_offset(scores: &Array1<f64>, contamination: f64) -> f64 {
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    if sorted.is_empty() {
        return f64::NEG_INFINITY;
    }

    let pos = contamination * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn grow(
    data: ArrayView2<'_, f64>,
    rows: Vec<usize>,
    depth: usize,
    max_depth: usize,
    rng: &mut StdRng,
) -> Node {
    if depth >= max_depth || rows.len() <= 1 {
        return Node::Leaf { size: rows.len() };
    }

    let candidates: Vec<(usize, f64, f64)> = (0..data.ncols())
        .filter_map(|f| column_range(data, f, Some(rows.as_slice())).map(|(lo, hi)| (f, lo, hi)))
        .collect();

    if candidates.is_empty() {
        return Node::Leaf { size: rows.len() };
    }

    let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
    let threshold = rng.gen_range(lo..hi);

    let (left, right): (Vec<usize>, Vec<usize>) =
        rows.into_iter().partition(|&r| data[[r, feature]] <= threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(grow(data, left, depth + 1, max_depth, rng)),
        right: Box::new(grow(data, right, depth + 1, max_depth, rng)),
    }
}

/// `(min, max)` of a column over the given rows, `None` when constant
fn column_range(data: ArrayView2<'_, f64>, feature: usize, rows: Option<&[usize]>) -> Option<(f64, f64)> {
    let column = data.column(feature);
    let (lo, hi) = match rows {
        Some(rows) => rows.iter().map(|&r| column[r]).fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), v| (lo.min(v), hi.max(v)),
        ),
        None => column.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), &v| (lo.min(v), hi.max(v)),
        ),
    };

    if lo < hi { Some((lo, hi)) } else { None }
}

fn path_length(node: &Node, point: &[f64]) -> f64 {
    let mut node = node;
    let mut depth = 0.0;

    loop {
        match node {
            Node::Leaf { size } => return depth + average_path_length(*size),
            Node::Split { feature, threshold, left, right } => {
                node = if point[*feature] <= *threshold { left } else { right };
                depth += 1.0;
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over `n` points
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}
