//! Tolerant extraction of score payloads from judge responses.
//!
//! Judges are asked for bare JSON but routinely wrap it in prose or code
//! fences. Extraction tries the whole text, then a fenced block, then the
//! outermost brace-delimited substring before giving up with a parse error.

use crate::dimension::Dimension;
use crate::errors::EvalError;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref FIRST_INT: Regex = Regex::new(r"\d+").unwrap();
}

/// Score payload for a single dimension, as judges are asked to emit it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorePayload {
    pub score: u32,
    pub deductions: Option<String>,
    pub evaluation: Option<String>,
    pub issues: Option<String>,
}

/// Parses a judge response into the payload for `dimension`.
pub fn parse_dimension_response(text: &str, dimension: Dimension) -> Result<ScorePayload, EvalError> {
    let doc = extract_json(text)?;
    dimension_payload(&doc, dimension)
}

/// Pulls a JSON object out of arbitrary judge output.
pub fn extract_json(text: &str) -> Result<Value, EvalError> {
    let trimmed = text.trim();
    if let Ok(doc) = serde_json::from_str::<Value>(trimmed) {
        if doc.is_object() {
            return Ok(doc);
        }
    }
    if let Some(block) = fenced_block(text) {
        if let Ok(doc) = serde_json::from_str::<Value>(block.trim()) {
            if doc.is_object() {
                return Ok(doc);
            }
        }
    }
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(doc) = serde_json::from_str::<Value>(&text[start..=end]) {
                if doc.is_object() {
                    return Ok(doc);
                }
            }
        }
    }
    Err(EvalError::parse(format!(
        "no JSON object in response: {}",
        snippet(text, 120)
    )))
}

/// Body of the first code fence, tolerating a language tag after the
/// opening backticks.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_tag = text[open + 3..].find('\n')? + open + 4;
    let close = text[after_tag..].find("```")? + after_tag;
    Some(&text[after_tag..close])
}

/// Locates the payload for `dimension` inside an extracted document.
/// Accepts the keyed form, a `scores` wrapper, or a bare payload.
fn dimension_payload(doc: &Value, dimension: Dimension) -> Result<ScorePayload, EvalError> {
    let key = dimension.schema_key();
    if let Some(node) = doc.get(key) {
        return payload_from(node, key);
    }
    if let Some(node) = doc.pointer(&format!("/scores/{key}")) {
        return payload_from(node, key);
    }
    payload_from(doc, key)
}

fn payload_from(node: &Value, key: &str) -> Result<ScorePayload, EvalError> {
    let score_node = node
        .get("score")
        .ok_or_else(|| EvalError::parse(format!("no score field for {key}")))?;
    Ok(ScorePayload {
        score: parse_score(score_node, key)?,
        deductions: string_field(node, "deductions"),
        evaluation: string_field(node, "evaluation"),
        issues: string_field(node, "issues"),
    })
}

/// Scores arrive as numbers or as strings like `"28"` or `"28/30"`; for
/// strings the first integer substring wins. Negative numbers floor at zero.
fn parse_score(node: &Value, key: &str) -> Result<u32, EvalError> {
    if let Some(n) = node.as_u64() {
        return Ok(n.min(u64::from(u32::MAX)) as u32);
    }
    if let Some(n) = node.as_i64() {
        return Ok(n.max(0) as u32);
    }
    if let Some(n) = node.as_f64() {
        if n < 0.0 {
            return Ok(0);
        }
        return Ok(n.round() as u32);
    }
    if let Some(s) = node.as_str() {
        if let Some(m) = FIRST_INT.find(s) {
            if let Ok(n) = m.as_str().parse::<u32>() {
                return Ok(n);
            }
        }
    }
    Err(EvalError::parse(format!(
        "unusable score for {key}: {node}"
    )))
}

/// Free-text fields may be strings or arrays of strings.
fn string_field(node: &Value, field: &str) -> Option<String> {
    match node.get(field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; ");
            if joined.is_empty() {
                None
            } else {
                Some(joined)
            }
        }
        _ => None,
    }
}

/// Char-safe prefix of `text` with newlines flattened, for log and error
/// messages.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_bare_json_document() {
        let payload = parse_dimension_response(
            r#"{"score": 27, "deductions": "minor omissions"}"#,
            Dimension::Accuracy,
        )
        .unwrap();
        assert_eq!(payload.score, 27);
        assert_eq!(payload.deductions.as_deref(), Some("minor omissions"));
    }

    #[test]
    fn parses_a_fenced_block_with_prose_around_it() {
        let text = "Sure! Here is my assessment:\n```json\n{\"score\": 4}\n```\nHope that helps.";
        let payload = parse_dimension_response(text, Dimension::Utility).unwrap();
        assert_eq!(payload.score, 4);
    }

    #[test]
    fn falls_back_to_the_brace_delimited_substring() {
        let text = "The artifact is decent overall. {\"score\": 18, \"issues\": \"thin examples\"} Final.";
        let payload = parse_dimension_response(text, Dimension::Completeness).unwrap();
        assert_eq!(payload.score, 18);
        assert_eq!(payload.issues.as_deref(), Some("thin examples"));
    }

    #[test]
    fn picks_the_keyed_entry_from_a_multi_dimension_document() {
        let text = r#"{
            "accuracy": {"score": 28, "evaluation": "solid"},
            "completeness": {"score": 20}
        }"#;
        let payload = parse_dimension_response(text, Dimension::Completeness).unwrap();
        assert_eq!(payload.score, 20);

        let keyed = parse_dimension_response(text, Dimension::Accuracy).unwrap();
        assert_eq!(keyed.score, 28);
        assert_eq!(keyed.evaluation.as_deref(), Some("solid"));
    }

    #[test]
    fn unwraps_a_scores_envelope() {
        let text = r#"{"scores": {"structure": {"score": 12, "issues": ["no headings", "walls of text"]}}}"#;
        let payload = parse_dimension_response(text, Dimension::Structure).unwrap();
        assert_eq!(payload.score, 12);
        assert_eq!(
            payload.issues.as_deref(),
            Some("no headings; walls of text")
        );
    }

    #[test]
    fn reads_the_first_integer_out_of_string_scores() {
        let payload =
            parse_dimension_response(r#"{"score": "28/30"}"#, Dimension::Accuracy).unwrap();
        assert_eq!(payload.score, 28);
    }

    #[test]
    fn negative_and_fractional_scores_normalize() {
        let negative = parse_dimension_response(r#"{"score": -5}"#, Dimension::Language).unwrap();
        assert_eq!(negative.score, 0);

        let fractional =
            parse_dimension_response(r#"{"score": 8.6}"#, Dimension::Language).unwrap();
        assert_eq!(fractional.score, 9);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = parse_dimension_response("I refuse to answer.", Dimension::Accuracy).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn missing_score_field_is_a_parse_error() {
        let err =
            parse_dimension_response(r#"{"grade": "good"}"#, Dimension::Accuracy).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn snippet_truncates_and_flattens() {
        assert_eq!(snippet("a\nb", 10), "a b");
        let long = "x".repeat(50);
        let cut = snippet(&long, 10);
        assert_eq!(cut, format!("{}...", "x".repeat(10)));
    }
}
