//! Retry/backoff wrapper around judge calls.
//!
//! Transport failures and blank responses share one bounded attempt budget;
//! `max_retries` counts total attempts, so a judge that stays blank with
//! `max_retries = 3` is called exactly three times before the task fails.

use super::{CallOptions, JudgeClient};
use crate::errors::EvalError;
use std::time::Duration;
use tokio::time::{sleep, timeout};

const BACKOFF_CAP: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub call_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, call_timeout: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            call_timeout,
        }
    }

    /// Delay after the given 1-based attempt: `base * 2^(attempt-1)`, capped.
    fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << shift).min(BACKOFF_CAP)
    }
}

/// Calls the judge until it yields non-blank text or the budget is spent.
/// Non-retryable errors pass straight through; exhaustion returns the last
/// cause with the total attempt count.
pub async fn call_judge(
    client: &dyn JudgeClient,
    prompt: &str,
    options: &CallOptions,
    policy: &RetryPolicy,
) -> Result<String, EvalError> {
    let mut attempts: u32 = 0;
    let mut last_was_empty = false;
    let mut last_message = String::from("no attempts made");

    while attempts < policy.max_retries {
        attempts += 1;
        let outcome = match timeout(policy.call_timeout, client.call(prompt, options)).await {
            Ok(result) => result,
            Err(_) => Err(EvalError::Transport {
                attempts: 1,
                message: format!(
                    "judge call timed out after {}s",
                    policy.call_timeout.as_secs()
                ),
            }),
        };

        match outcome {
            Ok(text) => {
                if !text.trim().is_empty() {
                    return Ok(text);
                }
                last_was_empty = true;
                tracing::warn!(
                    model = client.model_id(),
                    attempt = attempts,
                    max_retries = policy.max_retries,
                    "judge returned an empty response"
                );
            }
            Err(err) => {
                if !err.is_retryable() {
                    return Err(err);
                }
                last_was_empty = false;
                last_message = match err {
                    EvalError::Transport { message, .. } => message,
                    other => other.to_string(),
                };
                tracing::warn!(
                    model = client.model_id(),
                    attempt = attempts,
                    max_retries = policy.max_retries,
                    error = %last_message,
                    "judge call failed"
                );
            }
        }

        if attempts < policy.max_retries {
            sleep(policy.backoff(attempts)).await;
        }
    }

    if last_was_empty {
        Err(EvalError::EmptyResponse { attempts })
    } else {
        Err(EvalError::Transport {
            attempts,
            message: last_message,
        })
    }
}
