//! Error taxonomy for the evaluation engine.
//!
//! Task-level errors never cross task boundaries: the scheduler catches
//! every `EvalError` at task granularity and records the outcome. The
//! variants encode the handling policy: `Transport` and `EmptyResponse`
//! are retried within one bounded attempt budget, `Parse` turns into a
//! zero-score result, `Configuration` fails the task immediately, and
//! `Persistence` leaves the task pending so a resumed run retries it.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    /// Network/API failure while talking to a judge. Retried with backoff;
    /// on exhaustion carries the total attempt count and the last cause.
    #[error("transport failure after {attempts} attempt(s): {message}")]
    Transport { attempts: u32, message: String },

    /// The judge answered with blank text on every attempt.
    #[error("judge returned an empty response after {attempts} attempt(s)")]
    EmptyResponse { attempts: u32 },

    /// No structured score object could be recovered from the judge text.
    /// Never retried; the evaluator records a zero-score result instead.
    #[error("could not parse a score object: {detail}")]
    Parse { detail: String },

    /// Unknown model, missing credential, missing artifact or an invalid
    /// config value. Fatal for the affected task without any retry.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Disk read/write failure. Fatal for the task; the task stays absent
    /// from the ledger so a future resume re-attempts it.
    #[error("persistence failure at {}: {message}", path.display())]
    Persistence { path: PathBuf, message: String },
}

impl EvalError {
    pub fn parse(detail: impl Into<String>) -> Self {
        EvalError::Parse {
            detail: detail.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        EvalError::Configuration {
            message: message.into(),
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, cause: impl std::fmt::Display) -> Self {
        EvalError::Persistence {
            path: path.into(),
            message: cause.to_string(),
        }
    }

    /// Whether the retry wrapper may re-attempt the call that produced this.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EvalError::Transport { .. } | EvalError::EmptyResponse { .. }
        )
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, EvalError::Parse { .. })
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, EvalError::Persistence { .. })
    }
}

/// Failures while loading the evaluation config or the model registry.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for EvalError {
    fn from(err: ConfigError) -> Self {
        EvalError::configuration(err.to_string())
    }
}
