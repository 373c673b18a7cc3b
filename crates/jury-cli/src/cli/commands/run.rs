use super::super::args::RunArgs;
use super::reports::write_all_reports;
use crate::exit_codes::{SUCCESS, TASK_FAILURES};
use anyhow::Context;
use chrono::Utc;
use jury_core::artifacts::FsArtifactStore;
use jury_core::config::load_config;
use jury_core::engine::Engine;
use jury_core::registry::ModelRegistry;
use jury_core::report::console::{default_progress_sink, print_run_summary};
use jury_core::report::summary::RunSummary;
use std::sync::Arc;

pub(crate) async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let mut config = load_config(&args.config)
        .with_context(|| format!("failed to load config {}", args.config.display()))?;
    if let Some(workers) = args.workers {
        config.workers = workers.max(1);
    }
    if args.refresh {
        config.cache_enabled = false;
    }

    let registry = ModelRegistry::from_file(&config.registry)
        .with_context(|| format!("failed to load registry {}", config.registry.display()))?;
    let artifacts = Arc::new(FsArtifactStore::new(config.artifacts_dir.clone()));

    let engine = Engine::new(config, &registry, artifacts)?.with_progress(default_progress_sink());

    let started_at = Utc::now();
    let counts = engine.run().await?;
    let finished_at = Utc::now();

    print_run_summary(&counts);

    let store = engine.store();
    let summary = RunSummary::new(started_at, finished_at, counts, engine.config());
    store.write_json(&store.run_summary_path(), &summary)?;

    if !args.no_reports {
        write_all_reports(store, engine.config())?;
    }

    if counts.failed > 0 {
        return Ok(TASK_FAILURES);
    }
    Ok(SUCCESS)
}
