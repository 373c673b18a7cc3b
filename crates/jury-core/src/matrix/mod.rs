//! Score matrix projection.
//!
//! The matrix is a pure read-side view over stored verdicts. Rows are
//! producers, columns are evaluators; a `None` cell was never evaluated,
//! which is not the same thing as a zero score.

pub mod stats;

use crate::config::EvalConfig;
use crate::model::AggregatedResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use stats::{mean, population_stddev, CellStats};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub rank: usize,
    pub model: String,
    pub mean_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMatrix {
    /// Subject name, or "global" when folded across all subjects.
    pub scope: String,
    pub producers: Vec<String>,
    pub evaluators: Vec<String>,
    /// `cells[producer][evaluator]`.
    pub cells: Vec<Vec<Option<CellStats>>>,
    /// Mean score per cell for each dimension that appears in the verdicts.
    pub dimension_matrices: BTreeMap<String, Vec<Vec<Option<f64>>>>,
    /// Row means: how well each producer's artifacts scored.
    pub producer_means: Vec<Option<f64>>,
    /// Column means: how strictly each evaluator judged.
    pub evaluator_means: Vec<Option<f64>>,
    pub rankings: Vec<Ranking>,
    /// Spread of the filled cell means; high values mean the jury disagrees.
    pub consistency: Option<f64>,
    pub missing_cells: usize,
}

/// Projects stored verdicts onto fixed producer/evaluator axes. The axes
/// come from configuration, not from the data, so a producer whose tasks
/// all failed still shows up as an empty row.
#[derive(Debug, Clone)]
pub struct MatrixBuilder {
    producers: Vec<String>,
    evaluators: Vec<String>,
}

impl MatrixBuilder {
    pub fn new(producers: Vec<String>, evaluators: Vec<String>) -> Self {
        Self {
            producers,
            evaluators,
        }
    }

    pub fn from_config(config: &EvalConfig) -> Self {
        Self::new(config.producers.clone(), config.evaluators().to_vec())
    }

    pub fn build(&self, scope: &str, results: &[AggregatedResult]) -> ScoreMatrix {
        let rows = self.producers.len();
        let cols = self.evaluators.len();
        let mut totals: Vec<Vec<Vec<f64>>> = vec![vec![Vec::new(); cols]; rows];
        let mut dimension_scores: BTreeMap<String, Vec<Vec<Vec<f64>>>> = BTreeMap::new();

        for result in results {
            let Some(pi) = self.producers.iter().position(|p| p == &result.producer) else {
                tracing::debug!(producer = %result.producer, "verdict outside the producer axis");
                continue;
            };
            let Some(ei) = self.evaluators.iter().position(|e| e == &result.evaluator) else {
                tracing::debug!(evaluator = %result.evaluator, "verdict outside the evaluator axis");
                continue;
            };
            totals[pi][ei].push(f64::from(result.total_score));
            for dim in &result.dimensions {
                dimension_scores
                    .entry(dim.dimension.to_string())
                    .or_insert_with(|| vec![vec![Vec::new(); cols]; rows])[pi][ei]
                    .push(f64::from(dim.score));
            }
        }

        let cells: Vec<Vec<Option<CellStats>>> = totals
            .iter()
            .map(|row| row.iter().map(|s| CellStats::from_scores(s)).collect())
            .collect();

        let dimension_matrices = dimension_scores
            .into_iter()
            .map(|(name, grid)| {
                let means = grid
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|s| if s.is_empty() { None } else { Some(mean(s)) })
                            .collect()
                    })
                    .collect();
                (name, means)
            })
            .collect();

        let producer_means: Vec<Option<f64>> = cells.iter().map(|row| axis_mean(row)).collect();
        let evaluator_means: Vec<Option<f64>> = (0..cols)
            .map(|ei| {
                let column: Vec<Option<CellStats>> =
                    cells.iter().map(|row| row[ei]).collect();
                axis_mean(&column)
            })
            .collect();

        let mut rankings: Vec<Ranking> = self
            .producers
            .iter()
            .zip(&producer_means)
            .filter_map(|(model, mean_score)| {
                mean_score.map(|mean_score| Ranking {
                    rank: 0,
                    model: model.clone(),
                    mean_score,
                })
            })
            .collect();
        rankings.sort_by(|a, b| {
            b.mean_score
                .partial_cmp(&a.mean_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.model.cmp(&b.model))
        });
        for (index, entry) in rankings.iter_mut().enumerate() {
            entry.rank = index + 1;
        }

        let filled: Vec<f64> = cells
            .iter()
            .flatten()
            .filter_map(|cell| cell.map(|c| c.mean))
            .collect();
        let consistency = if filled.is_empty() {
            None
        } else {
            Some(population_stddev(&filled))
        };
        let missing_cells = rows * cols - filled.len();

        ScoreMatrix {
            scope: scope.to_string(),
            producers: self.producers.clone(),
            evaluators: self.evaluators.clone(),
            cells,
            dimension_matrices,
            producer_means,
            evaluator_means,
            rankings,
            consistency,
            missing_cells,
        }
    }
}

fn axis_mean(cells: &[Option<CellStats>]) -> Option<f64> {
    let present: Vec<f64> = cells.iter().filter_map(|c| c.map(|s| s.mean)).collect();
    if present.is_empty() {
        None
    } else {
        Some(mean(&present))
    }
}

/// Renders cell means as CSV, producers down and evaluators across. Cells
/// that were never evaluated stay empty.
pub fn to_csv(matrix: &ScoreMatrix) -> String {
    let mut out = String::new();
    out.push_str("producer");
    for evaluator in &matrix.evaluators {
        out.push(',');
        out.push_str(&csv_field(evaluator));
    }
    out.push('\n');
    for (pi, producer) in matrix.producers.iter().enumerate() {
        out.push_str(&csv_field(producer));
        for cell in &matrix.cells[pi] {
            out.push(',');
            if let Some(stats) = cell {
                out.push_str(&format!("{:.2}", stats.mean));
            }
        }
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
