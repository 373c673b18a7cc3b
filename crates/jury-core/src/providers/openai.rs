//! Chat-completions client for OpenAI-compatible providers (OpenAI,
//! OpenRouter, DeepSeek and the like share this wire shape).

use super::{CallOptions, JudgeClient};
use crate::errors::EvalError;
use crate::registry::ModelSpec;
use async_trait::async_trait;
use serde_json::json;

#[derive(Debug)]
pub struct OpenAiCompatClient {
    model: String,
    provider: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    /// Fails with a configuration error when the credential env named by the
    /// registry entry is not set; there is no point dispatching that task.
    pub fn new(model_id: &str, spec: &ModelSpec) -> Result<Self, EvalError> {
        let api_key = std::env::var(&spec.api_key_env).map_err(|_| {
            EvalError::configuration(format!(
                "credential env '{}' for model '{}' is not set",
                spec.api_key_env, model_id
            ))
        })?;
        Ok(Self {
            model: model_id.to_string(),
            provider: spec.provider.clone(),
            base_url: spec.base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl JudgeClient for OpenAiCompatClient {
    async fn call(&self, prompt: &str, options: &CallOptions) -> Result<String, EvalError> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|err| EvalError::Transport {
                attempts: 1,
                message: format!("request to {} failed: {err}", self.provider),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EvalError::Transport {
                attempts: 1,
                message: format!(
                    "{} API error {status}: {}",
                    self.provider,
                    head(&detail, 300)
                ),
            });
        }

        let value: serde_json::Value =
            response.json().await.map_err(|err| EvalError::Transport {
                attempts: 1,
                message: format!("invalid JSON body from {}: {err}", self.provider),
            })?;

        // A present-but-empty content field falls through to the retry
        // wrapper's empty-response handling.
        let text = value
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(text)
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        &self.provider
    }
}

fn head(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}
