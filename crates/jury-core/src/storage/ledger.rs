//! Append-style run ledger, rewritten atomically after every task outcome.
//!
//! The ledger records only terminal states. A task that died before its
//! verdict reached disk has no entry at all, so the next run picks it up
//! again instead of trusting a status it cannot back with data.

use super::{naming, write_atomic};
use crate::errors::EvalError;
use crate::model::{TaskKey, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub status: TaskStatus,
    pub finished_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    entries: BTreeMap<String, LedgerEntry>,
}

impl Ledger {
    /// Opens the ledger at `path`, starting empty when the file is absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, EvalError> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| EvalError::persistence(path.clone(), e))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(EvalError::persistence(path.clone(), err)),
        };
        Ok(Self { path, entries })
    }

    pub fn get(&self, key: &TaskKey) -> Option<&LedgerEntry> {
        self.entries.get(&naming::task_id(key))
    }

    pub fn is_completed(&self, key: &TaskKey) -> bool {
        matches!(
            self.get(key),
            Some(LedgerEntry {
                status: TaskStatus::Completed,
                ..
            })
        )
    }

    /// Records a terminal outcome and flushes the whole ledger to disk.
    pub fn record(
        &mut self,
        key: &TaskKey,
        status: TaskStatus,
        error: Option<String>,
    ) -> Result<(), EvalError> {
        self.entries.insert(
            naming::task_id(key),
            LedgerEntry {
                status,
                finished_at: Utc::now(),
                error,
            },
        );
        self.flush()
    }

    fn flush(&self) -> Result<(), EvalError> {
        let bytes = serde_json::to_vec_pretty(&self.entries)
            .map_err(|e| EvalError::persistence(self.path.clone(), e))?;
        write_atomic(&self.path, &bytes)
    }

    pub fn completed_count(&self) -> usize {
        self.count(TaskStatus::Completed)
    }

    pub fn failed_count(&self) -> usize {
        self.count(TaskStatus::Failed)
    }

    fn count(&self, status: TaskStatus) -> usize {
        self.entries.values().filter(|e| e.status == status).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &LedgerEntry)> {
        self.entries.iter()
    }
}
