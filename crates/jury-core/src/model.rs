//! Domain types shared across the engine, the store and the matrix builder.

use crate::dimension::Dimension;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unit of judge work: `producer`'s artifact for `subject`, scored by
/// `evaluator`. Dimensions are iterated inside the task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskKey {
    pub subject: String,
    pub producer: String,
    pub evaluator: String,
}

impl TaskKey {
    pub fn new(
        subject: impl Into<String>,
        producer: impl Into<String>,
        evaluator: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            producer: producer.into(),
            evaluator: evaluator.into(),
        }
    }
}

/// Task lifecycle. `Pending` and `Running` are in-memory states; the ledger
/// only ever stores `Completed` and `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Score for one dimension of one artifact, as judged by one evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionResult {
    pub dimension: Dimension,
    pub score: u32,
    pub max_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Full scored verdict for one (subject, producer, evaluator) key.
/// Immutable once written; re-runs overwrite the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub subject: String,
    pub producer: String,
    pub evaluator: String,
    pub total_score: u32,
    pub max_total_score: u32,
    pub grade: String,
    pub dimensions: Vec<DimensionResult>,
    pub feedback: Vec<String>,
    pub evaluated_at: DateTime<Utc>,
}

/// Final tallies for one engine invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunCounts {
    pub fn total(&self) -> usize {
        self.completed + self.failed + self.skipped
    }
}

/// Letter grade band for a total score.
pub fn grade(total_score: u32, max_total_score: u32) -> &'static str {
    if max_total_score == 0 {
        return "F";
    }
    let pct = (total_score as u64 * 100) / max_total_score as u64;
    match pct {
        p if p >= 90 => "A",
        p if p >= 80 => "B",
        p if p >= 70 => "C",
        p if p >= 60 => "D",
        _ => "F",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_bands() {
        assert_eq!(grade(95, 100), "A");
        assert_eq!(grade(90, 100), "A");
        assert_eq!(grade(89, 100), "B");
        assert_eq!(grade(48, 55), "B");
        assert_eq!(grade(70, 100), "C");
        assert_eq!(grade(60, 100), "D");
        assert_eq!(grade(0, 100), "F");
        assert_eq!(grade(0, 0), "F");
    }

    #[test]
    fn counts_total() {
        let counts = RunCounts {
            completed: 3,
            failed: 1,
            skipped: 2,
        };
        assert_eq!(counts.total(), 6);
    }

    #[test]
    fn task_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Failed).unwrap(),
            "\"failed\""
        );
    }
}
