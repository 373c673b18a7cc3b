use super::super::args::StatusArgs;
use crate::exit_codes::SUCCESS;
use anyhow::Context;
use jury_core::config::load_config;
use jury_core::engine::enumerate_tasks;
use jury_core::model::TaskStatus;
use jury_core::storage::ledger::Ledger;
use jury_core::storage::ResultStore;

pub(crate) fn run(args: StatusArgs) -> anyhow::Result<i32> {
    let config = load_config(&args.config)
        .with_context(|| format!("failed to load config {}", args.config.display()))?;
    let store = ResultStore::new(config.output_dir.clone());
    let ledger = Ledger::open(store.ledger_path())?;

    let expected = enumerate_tasks(&config).len();
    let completed = ledger.completed_count();
    let failed = ledger.failed_count();
    let pending = expected.saturating_sub(completed + failed);

    eprintln!(
        "Docket: {expected} task(s) across {} subject(s)",
        config.subjects.len()
    );
    eprintln!("  completed: {completed}");
    eprintln!("  failed:    {failed}");
    eprintln!("  pending:   {pending}");

    for (task_id, entry) in ledger.entries() {
        if entry.status == TaskStatus::Failed {
            let reason = entry.error.as_deref().unwrap_or("unknown error");
            eprintln!("❌ {task_id}: {reason}");
        }
    }
    Ok(SUCCESS)
}
