//! Judge transports. Provider variants differ in transport/auth only; the
//! calling contract is one prompt in, free-form text out.

pub mod fake;
pub mod openai;
pub mod retry;

use crate::errors::EvalError;
use crate::registry::ModelRegistry;
use async_trait::async_trait;
use std::sync::Arc;

/// Invocation parameters shared by every judge call.
#[derive(Debug, Clone, Copy)]
pub struct CallOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 2000,
        }
    }
}

#[async_trait]
pub trait JudgeClient: Send + Sync + std::fmt::Debug {
    /// One judge invocation. Returns the raw response text; blank text is
    /// legal here and handled by the retry wrapper.
    async fn call(&self, prompt: &str, options: &CallOptions) -> Result<String, EvalError>;

    /// Model id the client was built for.
    fn model_id(&self) -> &str;

    fn provider_name(&self) -> &str;
}

/// Builds the transport for a model from the injected registry.
pub fn client_for(
    registry: &ModelRegistry,
    model_id: &str,
) -> Result<Arc<dyn JudgeClient>, EvalError> {
    let spec = registry.resolve(model_id)?;
    Ok(Arc::new(openai::OpenAiCompatClient::new(model_id, spec)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModelSpec;

    #[test]
    fn factory_rejects_unknown_model() {
        let registry = ModelRegistry::default();
        let err = client_for(&registry, "nope").unwrap_err();
        assert!(matches!(err, EvalError::Configuration { .. }));
    }

    #[test]
    fn factory_requires_credential_env() {
        let registry = ModelRegistry::from_entries([(
            "m".to_string(),
            ModelSpec {
                provider: "openai".into(),
                api_key_env: "JURY_TEST_UNSET_CREDENTIAL".into(),
                base_url: "https://api.example.com/v1".into(),
                description: None,
            },
        )]);
        let err = client_for(&registry, "m").unwrap_err();
        assert!(err.to_string().contains("JURY_TEST_UNSET_CREDENTIAL"));
    }
}
