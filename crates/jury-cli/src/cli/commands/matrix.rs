use super::super::args::MatrixArgs;
use super::reports::{write_all_reports, write_subject_matrix};
use crate::exit_codes::SUCCESS;
use anyhow::Context;
use jury_core::config::load_config;
use jury_core::matrix::MatrixBuilder;
use jury_core::report::console::print_matrix;
use jury_core::storage::ResultStore;

pub(crate) fn run(args: MatrixArgs) -> anyhow::Result<i32> {
    let config = load_config(&args.config)
        .with_context(|| format!("failed to load config {}", args.config.display()))?;
    let store = ResultStore::new(config.output_dir.clone());

    match args.subject {
        Some(subject) => {
            anyhow::ensure!(
                config.subjects.contains(&subject),
                "subject '{subject}' is not in the configured docket"
            );
            let builder = MatrixBuilder::from_config(&config);
            let matrix = write_subject_matrix(&store, &builder, &subject)?;
            print_matrix(&matrix);
        }
        None => write_all_reports(&store, &config)?,
    }
    Ok(SUCCESS)
}
