//! File-backed persistence for verdicts, matrices and summaries.
//!
//! Every write goes through `write_atomic`: serialize fully, write to a
//! `.tmp` sibling, rename into place. A crash mid-run leaves either the old
//! document or the new one, never a torn file, which is what makes resume
//! by aggregate-existence sound.

pub mod ledger;
pub mod naming;

use crate::errors::EvalError;
use crate::model::{AggregatedResult, DimensionResult, TaskKey};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Layout under the output root:
///
/// ```text
/// results/<subject>/<producer>__by__<evaluator>/<dimension>.json
/// results/<subject>/<producer>__by__<evaluator>/raw/<dimension>.txt
/// results/<subject>/<producer>__by__<evaluator>/aggregate.json
/// matrices/<subject>.json            matrices/<subject>.csv
/// summary.json   run.json   ledger.json
/// ```
#[derive(Debug, Clone)]
pub struct ResultStore {
    root: PathBuf,
}

impl ResultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn task_dir(&self, key: &TaskKey) -> PathBuf {
        self.root
            .join("results")
            .join(naming::sanitize_component(&key.subject))
            .join(naming::pair_dir(&key.producer, &key.evaluator))
    }

    pub fn aggregate_path(&self, key: &TaskKey) -> PathBuf {
        self.task_dir(key).join("aggregate.json")
    }

    /// The skip check: a task whose aggregate exists is already done.
    pub fn has_aggregate(&self, key: &TaskKey) -> bool {
        self.aggregate_path(key).is_file()
    }

    pub fn put_aggregate(&self, key: &TaskKey, result: &AggregatedResult) -> Result<(), EvalError> {
        self.write_json(&self.aggregate_path(key), result)
    }

    pub fn get_aggregate(&self, key: &TaskKey) -> Option<AggregatedResult> {
        let bytes = fs::read(self.aggregate_path(key)).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn put_dimension(&self, key: &TaskKey, result: &DimensionResult) -> Result<(), EvalError> {
        let path = self
            .task_dir(key)
            .join(format!("{}.json", result.dimension));
        self.write_json(&path, result)
    }

    /// Raw judge text, kept verbatim next to the parsed score for audit.
    pub fn put_raw(
        &self,
        key: &TaskKey,
        dimension: crate::dimension::Dimension,
        text: &str,
    ) -> Result<(), EvalError> {
        let path = self
            .task_dir(key)
            .join("raw")
            .join(format!("{dimension}.txt"));
        self.write_text(&path, text)
    }

    pub fn aggregates_for_subject(&self, subject: &str) -> Vec<AggregatedResult> {
        let dir = self
            .root
            .join("results")
            .join(naming::sanitize_component(subject));
        let mut found = Self::collect_aggregates(&dir);
        Self::sort_aggregates(&mut found);
        found
    }

    pub fn all_aggregates(&self) -> Vec<AggregatedResult> {
        let results = self.root.join("results");
        let mut found = Vec::new();
        for entry in Self::subdirs(&results) {
            found.extend(Self::collect_aggregates(&entry));
        }
        Self::sort_aggregates(&mut found);
        found
    }

    fn collect_aggregates(subject_dir: &Path) -> Vec<AggregatedResult> {
        let mut found = Vec::new();
        for pair_dir in Self::subdirs(subject_dir) {
            let path = pair_dir.join("aggregate.json");
            let Ok(bytes) = fs::read(&path) else {
                continue;
            };
            match serde_json::from_slice::<AggregatedResult>(&bytes) {
                Ok(result) => found.push(result),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable verdict")
                }
            }
        }
        found
    }

    fn subdirs(dir: &Path) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut dirs: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();
        dirs
    }

    fn sort_aggregates(results: &mut [AggregatedResult]) {
        results.sort_by(|a, b| {
            (&a.subject, &a.producer, &a.evaluator).cmp(&(&b.subject, &b.producer, &b.evaluator))
        });
    }

    pub fn matrix_path(&self, subject: &str) -> PathBuf {
        self.root
            .join("matrices")
            .join(format!("{}.json", naming::sanitize_component(subject)))
    }

    pub fn matrix_csv_path(&self, subject: &str) -> PathBuf {
        self.root
            .join("matrices")
            .join(format!("{}.csv", naming::sanitize_component(subject)))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join("summary.json")
    }

    pub fn run_summary_path(&self) -> PathBuf {
        self.root.join("run.json")
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.root.join("ledger.json")
    }

    pub fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), EvalError> {
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| EvalError::persistence(path.to_path_buf(), e))?;
        write_atomic(path, &bytes)
    }

    pub fn write_text(&self, path: &Path, text: &str) -> Result<(), EvalError> {
        write_atomic(path, text.as_bytes())
    }
}

/// Write-to-temp-then-rename. The rename is atomic on the filesystems we
/// care about, so readers never observe a partial document.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), EvalError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| EvalError::persistence(path.to_path_buf(), e))?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).map_err(|e| EvalError::persistence(tmp.clone(), e))?;
    fs::rename(&tmp, path).map_err(|e| EvalError::persistence(path.to_path_buf(), e))
}
