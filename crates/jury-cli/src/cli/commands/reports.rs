//! Shared report generation for the run and matrix commands.

use jury_core::config::EvalConfig;
use jury_core::matrix::{self, MatrixBuilder, ScoreMatrix};
use jury_core::report::console::print_matrix;
use jury_core::report::summary::GlobalSummary;
use jury_core::storage::ResultStore;

/// Builds one subject's matrix from stored verdicts and writes the JSON and
/// CSV artifacts next to each other under `matrices/`.
pub(crate) fn write_subject_matrix(
    store: &ResultStore,
    builder: &MatrixBuilder,
    subject: &str,
) -> anyhow::Result<ScoreMatrix> {
    let results = store.aggregates_for_subject(subject);
    let matrix = builder.build(subject, &results);
    store.write_json(&store.matrix_path(subject), &matrix)?;
    store.write_text(&store.matrix_csv_path(subject), &matrix::to_csv(&matrix))?;
    Ok(matrix)
}

/// Regenerates every report from whatever verdicts are on disk: one matrix
/// per subject, a cross-subject matrix when there is more than one subject,
/// and the global summary.
pub(crate) fn write_all_reports(store: &ResultStore, config: &EvalConfig) -> anyhow::Result<()> {
    let builder = MatrixBuilder::from_config(config);
    for subject in &config.subjects {
        let matrix = write_subject_matrix(store, &builder, subject)?;
        print_matrix(&matrix);
    }

    let all = store.all_aggregates();
    if config.subjects.len() > 1 {
        let global = builder.build("global", &all);
        store.write_json(&store.matrix_path("global"), &global)?;
        store.write_text(&store.matrix_csv_path("global"), &matrix::to_csv(&global))?;
        print_matrix(&global);
    }

    let summary = GlobalSummary::from_aggregates(&all);
    store.write_json(&store.summary_path(), &summary)?;
    Ok(())
}
