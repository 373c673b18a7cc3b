//! Artifact store collaborator: maps (subject, producer) to the immutable
//! text under evaluation.

use crate::errors::EvalError;
use crate::storage::naming::sanitize_component;
use std::collections::HashMap;
use std::path::PathBuf;

pub trait ArtifactStore: Send + Sync {
    fn get(&self, subject: &str, producer: &str) -> Result<String, EvalError>;
}

/// Reads artifacts from `<root>/<subject>/<producer>.md`.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn artifact_path(&self, subject: &str, producer: &str) -> PathBuf {
        self.root
            .join(sanitize_component(subject))
            .join(format!("{}.md", sanitize_component(producer)))
    }
}

impl ArtifactStore for FsArtifactStore {
    fn get(&self, subject: &str, producer: &str) -> Result<String, EvalError> {
        let path = self.artifact_path(subject, producer);
        std::fs::read_to_string(&path).map_err(|err| {
            EvalError::configuration(format!(
                "artifact for subject '{}' by producer '{}' not readable at {}: {}",
                subject,
                producer,
                path.display(),
                err
            ))
        })
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    artifacts: HashMap<(String, String), String>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        subject: impl Into<String>,
        producer: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.artifacts
            .insert((subject.into(), producer.into()), text.into());
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn get(&self, subject: &str, producer: &str) -> Result<String, EvalError> {
        self.artifacts
            .get(&(subject.to_string(), producer.to_string()))
            .cloned()
            .ok_or_else(|| {
                EvalError::configuration(format!(
                    "no artifact for subject '{subject}' by producer '{producer}'"
                ))
            })
    }
}
