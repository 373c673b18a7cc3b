use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "jury",
    version,
    about = "Cross-model evaluation: every model's work is judged by every model"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Execute the evaluation docket and write reports
    Run(RunArgs),
    /// Rebuild score matrices and summaries from stored verdicts
    Matrix(MatrixArgs),
    /// Show ledger progress for the configured docket
    Status(StatusArgs),
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    #[arg(long, default_value = "jury.yaml")]
    pub config: PathBuf,

    /// Override the configured worker count (1 = sequential)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Re-judge tasks even when a stored verdict exists
    #[arg(long)]
    pub refresh: bool,

    /// Skip matrix/summary generation after the run
    #[arg(long)]
    pub no_reports: bool,
}

#[derive(Parser, Clone)]
pub struct MatrixArgs {
    #[arg(long, default_value = "jury.yaml")]
    pub config: PathBuf,

    /// Print a single subject instead of rebuilding everything
    #[arg(long)]
    pub subject: Option<String>,
}

#[derive(Parser, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "jury.yaml")]
    pub config: PathBuf,
}
