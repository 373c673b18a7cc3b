//! Filesystem naming for results and ledger keys.
//!
//! Model ids routinely contain `/` (`deepseek/deepseek-v3.1`), so every id
//! is sanitized before it becomes a path component or a ledger key.

use crate::model::TaskKey;

/// Replaces every character outside `[alphanumeric . _ -]` with `_`.
pub fn sanitize_component(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Directory name for one (producer, evaluator) pairing.
pub fn pair_dir(producer: &str, evaluator: &str) -> String {
    format!(
        "{}__by__{}",
        sanitize_component(producer),
        sanitize_component(evaluator)
    )
}

/// Stable ledger key for a task.
pub fn task_id(key: &TaskKey) -> String {
    format!(
        "{}/{}",
        sanitize_component(&key.subject),
        pair_dir(&key.producer, &key.evaluator)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(
            sanitize_component("deepseek/deepseek-v3.1"),
            "deepseek_deepseek-v3.1"
        );
        assert_eq!(sanitize_component("gpt-5.1"), "gpt-5.1");
        assert_eq!(sanitize_component("a b:c"), "a_b_c");
    }

    #[test]
    fn task_id_is_path_safe() {
        let key = TaskKey::new("case 7", "org/model", "judge");
        assert_eq!(task_id(&key), "case_7/org_model__by__judge");
    }
}
