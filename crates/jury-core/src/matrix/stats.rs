//! Summary statistics for matrix cells.

use serde::{Deserialize, Serialize};

/// Statistics over the scores that landed in one cell. In a single-subject
/// matrix `count` is 1 and the spread collapses; the global matrix folds
/// one score per subject into each cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellStats {
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl CellStats {
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            mean: mean(scores),
            stddev: population_stddev(scores),
            min,
            max,
            count: scores.len(),
        })
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; the scores are the whole population, not
/// a sample of one.
pub fn population_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
