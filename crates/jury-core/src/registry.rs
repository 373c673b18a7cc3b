//! Model registry: transport coordinates per model id.
//!
//! The registry is built once (usually from a JSON file), then injected
//! wherever judge clients are constructed. It is immutable after
//! construction; nothing in the engine mutates or reloads it.

use crate::errors::{ConfigError, EvalError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Transport coordinates for one model. The credential itself stays in the
/// named environment variable; the registry never holds secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub provider: String,
    pub api_key_env: String,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, ModelSpec>,
}

impl ModelRegistry {
    pub fn from_entries(entries: impl IntoIterator<Item = (String, ModelSpec)>) -> Self {
        Self {
            models: entries.into_iter().collect(),
        }
    }

    /// Loads and validates a registry file: a JSON map of model id to spec.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let models: BTreeMap<String, ModelSpec> =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        for (id, spec) in &models {
            if spec.provider.is_empty() || spec.api_key_env.is_empty() || spec.base_url.is_empty()
            {
                return Err(ConfigError::Invalid(format!(
                    "registry entry '{id}' must set provider, api_key_env and base_url"
                )));
            }
        }
        Ok(Self { models })
    }

    pub fn resolve(&self, model_id: &str) -> Result<&ModelSpec, EvalError> {
        self.models.get(model_id).ok_or_else(|| {
            EvalError::configuration(format!("unknown model '{model_id}' (not in registry)"))
        })
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.models.contains_key(model_id)
    }

    pub fn model_ids(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
