use crate::matrix::stats::CellStats;
use crate::matrix::ScoreMatrix;
use crate::model::RunCounts;
use crate::report::progress::{ProgressEvent, ProgressSink};
use std::sync::Arc;

/// Format a single progress line for display. Deterministic, unit-testable.
#[must_use]
pub fn format_progress_line(done: usize, total: usize) -> String {
    format!("Judging task {}/{}...", done, total)
}

/// Progress sink that prints one line per finished task to stderr. Judge
/// calls take seconds each, so no throttling is needed.
pub fn default_progress_sink() -> ProgressSink {
    Arc::new(|ev: ProgressEvent| {
        if ev.total > 0 {
            eprintln!("{}", format_progress_line(ev.done, ev.total));
        }
    })
}

pub fn print_run_summary(counts: &RunCounts) {
    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    let icon = if counts.failed == 0 { "✅" } else { "❌" };
    eprintln!(
        "{} Summary: {} completed, {} failed, {} skipped ({} tasks)",
        icon,
        counts.completed,
        counts.failed,
        counts.skipped,
        counts.total()
    );
}

/// Render one matrix cell: the mean score, or `-` when never evaluated.
#[must_use]
pub fn format_cell(cell: Option<&CellStats>) -> String {
    match cell {
        Some(stats) => format!("{:.2}", stats.mean),
        None => "-".to_string(),
    }
}

/// Deterministic text rendering of a score matrix, rankings included.
#[must_use]
pub fn format_matrix(matrix: &ScoreMatrix) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Scores for {} (rows judged, columns judging):\n",
        matrix.scope
    ));
    out.push_str(&format!("{:<24}", ""));
    for evaluator in &matrix.evaluators {
        out.push_str(&format!("{:>16}", truncate_id(evaluator)));
    }
    out.push('\n');
    for (pi, producer) in matrix.producers.iter().enumerate() {
        out.push_str(&format!("{:<24}", truncate_id(producer)));
        for cell in &matrix.cells[pi] {
            out.push_str(&format!("{:>16}", format_cell(cell.as_ref())));
        }
        out.push('\n');
    }

    if !matrix.rankings.is_empty() {
        out.push_str("\nRankings:\n");
        for entry in &matrix.rankings {
            out.push_str(&format!(
                "  {}. {:<24} {:.2}\n",
                entry.rank,
                truncate_id(&entry.model),
                entry.mean_score
            ));
        }
    }
    if let Some(consistency) = matrix.consistency {
        out.push_str(&format!("Judge disagreement (stddev): {consistency:.2}\n"));
    }
    if matrix.missing_cells > 0 {
        out.push_str(&format!("Unevaluated cells: {}\n", matrix.missing_cells));
    }
    out
}

pub fn print_matrix(matrix: &ScoreMatrix) {
    eprintln!("\n{}", format_matrix(matrix));
}

fn truncate_id(id: &str) -> String {
    if id.chars().count() > 22 {
        let prefix: String = id.chars().take(19).collect();
        format!("{prefix}...")
    } else {
        id.to_string()
    }
}
