//! Machine-readable summary output.
//!
//! `run.json` describes one engine invocation; `summary.json` folds every
//! stored verdict into population-level standings. Both carry a schema
//! version so downstream tooling can detect format changes.

use crate::config::EvalConfig;
use crate::matrix::stats::{population_stddev, CellStats};
use crate::model::{AggregatedResult, RunCounts};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Current schema version for run.json and summary.json.
pub const SCHEMA_VERSION: u32 = 1;

/// One engine invocation: what was asked for and how it ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub schema_version: u32,
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub counts: RunCounts,
    pub subjects: Vec<String>,
    pub producers: Vec<String>,
    pub evaluators: Vec<String>,
}

impl RunSummary {
    pub fn new(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        counts: RunCounts,
        config: &EvalConfig,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: Uuid::new_v4().to_string(),
            started_at,
            finished_at,
            counts,
            subjects: config.subjects.clone(),
            producers: config.producers.clone(),
            evaluators: config.evaluators().to_vec(),
        }
    }
}

/// Population standings across every stored verdict, all subjects folded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSummary {
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub subjects: Vec<String>,
    /// Per-producer statistics over every total score it received.
    pub model_scores: BTreeMap<String, CellStats>,
    /// Producer ids, best mean first; ties break on id.
    pub overall_rankings: Vec<String>,
    /// Spread of all total scores; `None` when nothing has been judged.
    pub score_consistency: Option<f64>,
}

impl GlobalSummary {
    pub fn from_aggregates(results: &[AggregatedResult]) -> Self {
        let mut subjects = BTreeSet::new();
        let mut per_producer: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut all_totals = Vec::new();
        for result in results {
            subjects.insert(result.subject.clone());
            per_producer
                .entry(result.producer.clone())
                .or_default()
                .push(f64::from(result.total_score));
            all_totals.push(f64::from(result.total_score));
        }

        let model_scores: BTreeMap<String, CellStats> = per_producer
            .into_iter()
            .filter_map(|(model, scores)| CellStats::from_scores(&scores).map(|s| (model, s)))
            .collect();

        let mut ranked: Vec<(&String, f64)> = model_scores
            .iter()
            .map(|(model, stats)| (model, stats.mean))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });

        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            subjects: subjects.into_iter().collect(),
            overall_rankings: ranked.into_iter().map(|(model, _)| model.clone()).collect(),
            model_scores,
            score_consistency: if all_totals.is_empty() {
                None
            } else {
                Some(population_stddev(&all_totals))
            },
        }
    }
}
