//! Scoring a single dimension of a single artifact through a judge model.

pub mod parse;
pub mod prompt;

use crate::dimension::DimensionSpec;
use crate::errors::EvalError;
use crate::model::DimensionResult;
use crate::providers::retry::{call_judge, RetryPolicy};
use crate::providers::{CallOptions, JudgeClient};
use parse::{parse_dimension_response, snippet};
use prompt::build_dimension_prompt;

/// A parsed dimension score together with the raw judge text it came from.
/// The raw text is persisted for audit even when parsing succeeded.
#[derive(Debug, Clone)]
pub struct EvaluatedDimension {
    pub result: DimensionResult,
    pub raw: String,
}

/// Runs one judge call per dimension and turns the response into a
/// `DimensionResult`. Unparseable responses become zero-score results
/// rather than task failures; the raw text is kept in the feedback so the
/// verdict stays auditable.
pub struct DimensionEvaluator {
    options: CallOptions,
    policy: RetryPolicy,
}

impl DimensionEvaluator {
    pub fn new(options: CallOptions, policy: RetryPolicy) -> Self {
        Self { options, policy }
    }

    pub async fn evaluate(
        &self,
        client: &dyn JudgeClient,
        spec: DimensionSpec,
        subject: &str,
        artifact: &str,
    ) -> Result<EvaluatedDimension, EvalError> {
        let prompt = build_dimension_prompt(spec.name, subject, artifact, spec.max_score);
        let raw = call_judge(client, &prompt, &self.options, &self.policy).await?;

        let result = match parse_dimension_response(&raw, spec.name) {
            Ok(payload) => {
                let score = if payload.score > spec.max_score {
                    tracing::warn!(
                        model = client.model_id(),
                        dimension = %spec.name,
                        score = payload.score,
                        max_score = spec.max_score,
                        "score exceeds the dimension maximum, clamping"
                    );
                    spec.max_score
                } else {
                    payload.score
                };
                DimensionResult {
                    dimension: spec.name,
                    score,
                    max_score: spec.max_score,
                    issues: payload.issues,
                    feedback: payload.evaluation.or(payload.deductions),
                }
            }
            Err(err) => {
                tracing::warn!(
                    model = client.model_id(),
                    dimension = %spec.name,
                    error = %err,
                    "unparseable judge response, scoring zero"
                );
                DimensionResult {
                    dimension: spec.name,
                    score: 0,
                    max_score: spec.max_score,
                    issues: Some("parse failure".into()),
                    feedback: Some(format!("raw response: {}", snippet(&raw, 200))),
                }
            }
        };

        Ok(EvaluatedDimension { result, raw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::Dimension;
    use crate::providers::fake::FakeJudge;
    use std::time::Duration;

    fn evaluator() -> DimensionEvaluator {
        DimensionEvaluator::new(
            CallOptions::default(),
            RetryPolicy::new(2, Duration::from_millis(1), Duration::from_millis(200)),
        )
    }

    fn accuracy_30() -> DimensionSpec {
        DimensionSpec {
            name: Dimension::Accuracy,
            max_score: 30,
        }
    }

    #[tokio::test]
    async fn valid_payload_becomes_a_result() {
        let judge = FakeJudge::new(
            "judge-a",
            r#"{"accuracy": {"score": 27, "evaluation": "mostly right", "issues": "one stale claim"}}"#,
        );
        let evaluated = evaluator()
            .evaluate(&judge, accuracy_30(), "subj", "body")
            .await
            .unwrap();
        assert_eq!(evaluated.result.score, 27);
        assert_eq!(evaluated.result.max_score, 30);
        assert_eq!(evaluated.result.feedback.as_deref(), Some("mostly right"));
        assert_eq!(evaluated.result.issues.as_deref(), Some("one stale claim"));
        assert!(evaluated.raw.contains("mostly right"));
    }

    #[tokio::test]
    async fn garbage_scores_zero_instead_of_failing() {
        let judge = FakeJudge::new("judge-a", "I would rather not grade this.");
        let evaluated = evaluator()
            .evaluate(&judge, accuracy_30(), "subj", "body")
            .await
            .unwrap();
        assert_eq!(evaluated.result.score, 0);
        assert_eq!(evaluated.result.issues.as_deref(), Some("parse failure"));
        assert!(evaluated
            .result
            .feedback
            .as_deref()
            .unwrap()
            .contains("raw response"));
        assert_eq!(judge.calls(), 1);
    }

    #[tokio::test]
    async fn scores_over_the_maximum_clamp() {
        let judge = FakeJudge::new("judge-a", r#"{"accuracy": {"score": 45}}"#);
        let evaluated = evaluator()
            .evaluate(&judge, accuracy_30(), "subj", "body")
            .await
            .unwrap();
        assert_eq!(evaluated.result.score, 30);
    }

    #[tokio::test]
    async fn transport_exhaustion_propagates() {
        let judge = FakeJudge::failing("judge-a");
        let err = evaluator()
            .evaluate(&judge, accuracy_30(), "subj", "body")
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::Transport { attempts: 2, .. }));
    }
}
