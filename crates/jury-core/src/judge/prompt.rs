//! Prompt construction for single-dimension judging calls.

use crate::dimension::Dimension;

/// Builds the judging prompt for one dimension of one artifact.
///
/// The response contract is spelled out inline so that tolerant parsing is
/// a fallback, not the expected path.
pub fn build_dimension_prompt(
    dimension: Dimension,
    subject: &str,
    artifact: &str,
    max_score: u32,
) -> String {
    let key = dimension.schema_key();
    format!(
        "You are grading a generated document on a single dimension.\n\
         \n\
         Subject: {subject}\n\
         Dimension: {label} ({key})\n\
         Rubric: {rubric}\n\
         Maximum score: {max_score}\n\
         \n\
         Document under review:\n\
         ---\n\
         {artifact}\n\
         ---\n\
         \n\
         Score the document from 0 to {max_score} on this dimension only.\n\
         Respond with JSON and nothing else, in exactly this shape:\n\
         {{\"{key}\": {{\"score\": <integer>, \"deductions\": \"<points lost and why>\", \
         \"evaluation\": \"<one-paragraph assessment>\", \"issues\": \"<specific problems, or empty>\"}}}}",
        label = dimension.label(),
        rubric = dimension.rubric(),
    )
}
