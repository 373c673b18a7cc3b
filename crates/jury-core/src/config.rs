//! Evaluation run configuration, loaded from a versioned YAML file.

use crate::dimension::{Dimension, DimensionSpec};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_VERSION: u32 = 1;

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_base_delay_ms() -> u64 {
    2000
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_workers() -> usize {
    3
}
fn default_cache_enabled() -> bool {
    true
}
fn default_temperature() -> f32 {
    0.0
}
fn default_max_tokens() -> u32 {
    2000
}
fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}
fn default_registry_path() -> PathBuf {
    PathBuf::from("model_registry.json")
}

/// The full 100-point scheme, used when a config lists no dimensions.
pub fn default_dimensions() -> Vec<DimensionSpec> {
    Dimension::ALL
        .iter()
        .map(|&name| DimensionSpec {
            name,
            max_score: name.default_max_score(),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Cases to evaluate.
    pub subjects: Vec<String>,
    /// Models whose artifacts are judged.
    pub producers: Vec<String>,
    /// Judging models; defaults to the producer population when empty.
    #[serde(default)]
    pub evaluators: Vec<String>,
    #[serde(default = "default_dimensions")]
    pub dimensions: Vec<DimensionSpec>,
    /// Whether a model's own artifact appears on its judging docket.
    #[serde(default)]
    pub include_self_evaluation: bool,
    /// Total attempt budget per judge call (transport and empty-response
    /// conditions share it).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 1 = sequential; >1 = bounded worker pool.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// When true, tasks with a stored aggregate are skipped.
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,
    /// Kept at zero for reproducible judging.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Model registry JSON file.
    #[serde(default = "default_registry_path")]
    pub registry: PathBuf,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            subjects: Vec::new(),
            producers: Vec::new(),
            evaluators: Vec::new(),
            dimensions: default_dimensions(),
            include_self_evaluation: false,
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            timeout_secs: default_timeout_secs(),
            workers: default_workers(),
            cache_enabled: default_cache_enabled(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            artifacts_dir: default_artifacts_dir(),
            output_dir: default_output_dir(),
            registry: default_registry_path(),
        }
    }
}

impl EvalConfig {
    /// Judging population: the configured evaluators, or the producers when
    /// the evaluator list is empty.
    pub fn evaluators(&self) -> &[String] {
        if self.evaluators.is_empty() {
            &self.producers
        } else {
            &self.evaluators
        }
    }

    pub fn max_total_score(&self) -> u32 {
        self.dimensions.iter().map(|d| d.max_score).sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subjects.is_empty() {
            return Err(ConfigError::Invalid("subjects list is empty".into()));
        }
        if self.producers.is_empty() {
            return Err(ConfigError::Invalid("producers list is empty".into()));
        }
        if self.dimensions.is_empty() {
            return Err(ConfigError::Invalid("dimensions list is empty".into()));
        }
        for (idx, spec) in self.dimensions.iter().enumerate() {
            if spec.max_score == 0 {
                return Err(ConfigError::Invalid(format!(
                    "dimension '{}' has max_score 0",
                    spec.name
                )));
            }
            if self.dimensions[..idx].iter().any(|d| d.name == spec.name) {
                return Err(ConfigError::Invalid(format!(
                    "dimension '{}' is listed twice",
                    spec.name
                )));
            }
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid("max_retries must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature {} is out of range [0, 2]",
                self.temperature
            )));
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<EvalConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: EvalConfig = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::Invalid(format!(
            "unsupported config version {} (expected {})",
            config.version, CONFIG_VERSION
        )));
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_yaml() -> &'static str {
        "subjects: [case-1]\nproducers: [model-a, model-b]\n"
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let config: EvalConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.workers, 3);
        assert_eq!(config.max_retries, 3);
        assert!(config.cache_enabled);
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.dimensions.len(), 5);
        assert_eq!(config.max_total_score(), 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn evaluators_default_to_producers() {
        let config: EvalConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        assert_eq!(config.evaluators(), config.producers.as_slice());

        let explicit: EvalConfig = serde_yaml::from_str(
            "subjects: [s]\nproducers: [a]\nevaluators: [x, y]\n",
        )
        .unwrap();
        assert_eq!(explicit.evaluators(), ["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn duplicate_dimension_is_rejected() {
        let config: EvalConfig = serde_yaml::from_str(
            "subjects: [s]\nproducers: [a]\ndimensions:\n  - name: accuracy\n    max_score: 30\n  - name: accuracy\n    max_score: 10\n",
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("listed twice"));
    }

    #[test]
    fn zero_knobs_are_rejected() {
        let mut config: EvalConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.max_retries = 0;
        assert!(config.validate().is_err());

        let mut config: EvalConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_checks_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jury.yaml");
        std::fs::write(&path, "version: 99\nsubjects: [s]\nproducers: [a]\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config version"));
    }

    #[test]
    fn load_config_reports_missing_file() {
        let err = load_config(Path::new("/nonexistent/jury.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
