//! Folding per-dimension scores into one verdict per task.

use crate::dimension::DimensionSpec;
use crate::model::{grade, AggregatedResult, DimensionResult, TaskKey};
use chrono::Utc;

/// Combines dimension results into the task verdict. The configured
/// dimension set is authoritative: results are reordered to match it,
/// scores are clamped to each dimension's maximum, and a dimension with no
/// result gets a zero placeholder so the total is always out of the same
/// maximum.
pub fn aggregate(
    key: &TaskKey,
    specs: &[DimensionSpec],
    mut results: Vec<DimensionResult>,
) -> AggregatedResult {
    let mut dimensions = Vec::with_capacity(specs.len());
    for spec in specs {
        let found = results
            .iter()
            .position(|r| r.dimension == spec.name)
            .map(|i| results.swap_remove(i));
        let entry = match found {
            Some(mut result) => {
                result.score = result.score.min(spec.max_score);
                result.max_score = spec.max_score;
                result
            }
            None => DimensionResult {
                dimension: spec.name,
                score: 0,
                max_score: spec.max_score,
                issues: Some("missing".into()),
                feedback: None,
            },
        };
        dimensions.push(entry);
    }

    let total_score: u32 = dimensions.iter().map(|d| d.score).sum();
    let max_total_score: u32 = specs.iter().map(|s| s.max_score).sum();
    let feedback: Vec<String> = dimensions
        .iter()
        .filter_map(|d| {
            d.issues
                .as_deref()
                .map(|issues| format!("{}: {}", d.dimension, issues))
        })
        .collect();

    AggregatedResult {
        subject: key.subject.clone(),
        producer: key.producer.clone(),
        evaluator: key.evaluator.clone(),
        total_score,
        max_total_score,
        grade: grade(total_score, max_total_score).to_string(),
        dimensions,
        feedback,
        evaluated_at: Utc::now(),
    }
}
