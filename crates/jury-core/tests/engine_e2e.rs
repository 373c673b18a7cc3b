//! End-to-end engine behavior against scripted judges: matrix projection,
//! verdict caching across runs, resume after partial completion, and
//! isolation of failing judges.

use jury_core::artifacts::MemoryArtifactStore;
use jury_core::config::EvalConfig;
use jury_core::dimension::{Dimension, DimensionSpec};
use jury_core::engine::{aggregate, Engine};
use jury_core::matrix::MatrixBuilder;
use jury_core::model::{DimensionResult, RunCounts, TaskKey, TaskStatus};
use jury_core::providers::fake::FakeJudge;
use jury_core::providers::JudgeClient;
use jury_core::report::progress::{ProgressEvent, ProgressSink};
use jury_core::storage::ledger::Ledger;
use jury_core::storage::ResultStore;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

const GOOD_REPLY: &str = r#"{"accuracy": {"score": 28}, "completeness": {"score": 20}}"#;

fn two_by_two_config(out: &Path) -> EvalConfig {
    EvalConfig {
        subjects: vec!["case-1".into()],
        producers: vec!["model-a".into(), "model-b".into()],
        dimensions: vec![
            DimensionSpec {
                name: Dimension::Accuracy,
                max_score: 30,
            },
            DimensionSpec {
                name: Dimension::Completeness,
                max_score: 25,
            },
        ],
        workers: 1,
        retry_base_delay_ms: 1,
        output_dir: out.to_path_buf(),
        ..EvalConfig::default()
    }
}

fn artifacts() -> Arc<MemoryArtifactStore> {
    let mut store = MemoryArtifactStore::new();
    store.insert("case-1", "model-a", "# Rust intro\nBy model-a.");
    store.insert("case-1", "model-b", "# Rust intro\nBy model-b.");
    Arc::new(store)
}

type Judges = (
    HashMap<String, Arc<dyn JudgeClient>>,
    Arc<FakeJudge>,
    Arc<FakeJudge>,
);

fn judges(reply: &str) -> Judges {
    let a = Arc::new(FakeJudge::new("model-a", reply));
    let b = Arc::new(FakeJudge::new("model-b", reply));
    let mut clients: HashMap<String, Arc<dyn JudgeClient>> = HashMap::new();
    clients.insert("model-a".into(), a.clone());
    clients.insert("model-b".into(), b.clone());
    (clients, a, b)
}

#[tokio::test]
async fn full_run_projects_a_two_by_two_matrix() {
    let dir = tempfile::tempdir().unwrap();
    let config = two_by_two_config(dir.path());
    let (clients, _, _) = judges(GOOD_REPLY);
    let engine = Engine::with_clients(config.clone(), clients, artifacts()).unwrap();

    let counts = engine.run().await.unwrap();
    assert_eq!(
        counts,
        RunCounts {
            completed: 2,
            failed: 0,
            skipped: 0
        }
    );

    let verdicts = engine.store().all_aggregates();
    assert_eq!(verdicts.len(), 2);
    assert!(verdicts
        .iter()
        .all(|v| v.total_score == 48 && v.max_total_score == 55 && v.grade == "B"));

    let matrix = MatrixBuilder::from_config(&config).build("case-1", &verdicts);
    assert!(matrix.cells[0][0].is_none(), "self-evaluation must stay empty");
    assert!(matrix.cells[1][1].is_none());
    assert_eq!(matrix.cells[0][1].unwrap().mean, 48.0);
    assert_eq!(matrix.cells[1][0].unwrap().mean, 48.0);
    assert_eq!(matrix.missing_cells, 2);
    // Equal means rank by model id.
    assert_eq!(matrix.rankings[0].model, "model-a");
    assert_eq!(matrix.rankings[1].model, "model-b");
}

#[tokio::test]
async fn rerun_skips_stored_verdicts_without_judge_calls() {
    let dir = tempfile::tempdir().unwrap();
    let config = two_by_two_config(dir.path());

    let (clients, a, b) = judges(GOOD_REPLY);
    let first = Engine::with_clients(config.clone(), clients, artifacts()).unwrap();
    first.run().await.unwrap();
    assert_eq!(a.calls() + b.calls(), 4, "2 tasks x 2 dimensions");

    let (clients, a, b) = judges(GOOD_REPLY);
    let second = Engine::with_clients(config, clients, artifacts()).unwrap();
    let counts = second.run().await.unwrap();
    assert_eq!(
        counts,
        RunCounts {
            completed: 0,
            failed: 0,
            skipped: 2
        }
    );
    assert_eq!(a.calls() + b.calls(), 0, "skipped tasks must not call judges");
}

#[tokio::test]
async fn resume_picks_up_only_the_missing_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let config = two_by_two_config(dir.path());

    // The (model-a judged by model-b) verdict is already on disk, as if a
    // previous run died after finishing one task.
    let store = ResultStore::new(dir.path());
    let done = TaskKey::new("case-1", "model-a", "model-b");
    let verdict = aggregate::aggregate(
        &done,
        &config.dimensions,
        vec![
            DimensionResult {
                dimension: Dimension::Accuracy,
                score: 28,
                max_score: 30,
                issues: None,
                feedback: None,
            },
            DimensionResult {
                dimension: Dimension::Completeness,
                score: 20,
                max_score: 25,
                issues: None,
                feedback: None,
            },
        ],
    );
    store.put_aggregate(&done, &verdict).unwrap();

    let (clients, a, b) = judges(GOOD_REPLY);
    let engine = Engine::with_clients(config.clone(), clients, artifacts()).unwrap();
    let counts = engine.run().await.unwrap();
    assert_eq!(
        counts,
        RunCounts {
            completed: 1,
            failed: 0,
            skipped: 1
        }
    );
    assert_eq!(b.calls(), 0, "the stored task's judge must not be re-asked");
    assert_eq!(a.calls(), 2, "the missing task runs both dimensions");

    let matrix =
        MatrixBuilder::from_config(&config).build("case-1", &engine.store().all_aggregates());
    assert_eq!(matrix.cells[0][1].unwrap().mean, 48.0);
    assert_eq!(matrix.cells[1][0].unwrap().mean, 48.0);
    assert_eq!(matrix.missing_cells, 2);
}

#[tokio::test]
async fn failing_judge_is_isolated_to_its_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = two_by_two_config(dir.path());
    config.max_retries = 2;

    let good = Arc::new(FakeJudge::new("model-a", GOOD_REPLY));
    let bad = Arc::new(FakeJudge::failing("model-b"));
    let mut clients: HashMap<String, Arc<dyn JudgeClient>> = HashMap::new();
    clients.insert("model-a".into(), good);
    clients.insert("model-b".into(), bad.clone());

    let engine = Engine::with_clients(config, clients, artifacts()).unwrap();
    let counts = engine.run().await.unwrap();
    assert_eq!(counts.completed, 1);
    assert_eq!(counts.failed, 1);
    assert_eq!(bad.calls(), 2, "budget of 2 attempts, first dimension only");

    let failed_key = TaskKey::new("case-1", "model-a", "model-b");
    let ledger = Ledger::open(engine.store().ledger_path()).unwrap();
    let entry = ledger.get(&failed_key).unwrap();
    assert_eq!(entry.status, TaskStatus::Failed);
    assert!(entry
        .error
        .as_deref()
        .unwrap()
        .contains("transport failure"));

    // The failed task leaves no verdict, so a later run re-attempts it.
    assert!(!engine.store().has_aggregate(&failed_key));
    assert_eq!(engine.store().all_aggregates().len(), 1);
}

#[tokio::test]
async fn persistent_empty_responses_fail_the_task() {
    let dir = tempfile::tempdir().unwrap();
    let config = two_by_two_config(dir.path());
    let (clients, a, b) = judges("");

    let engine = Engine::with_clients(config, clients, artifacts()).unwrap();
    let counts = engine.run().await.unwrap();
    assert_eq!(counts.completed, 0);
    assert_eq!(counts.failed, 2);
    // The first dimension exhausts the 3-attempt budget and fails the task.
    assert_eq!(a.calls(), 3);
    assert_eq!(b.calls(), 3);

    let ledger = Ledger::open(engine.store().ledger_path()).unwrap();
    let entry = ledger
        .get(&TaskKey::new("case-1", "model-a", "model-b"))
        .unwrap();
    assert!(entry
        .error
        .as_deref()
        .unwrap()
        .contains("empty response after 3"));
}

#[tokio::test]
async fn unparseable_judges_still_complete_with_zero_scores() {
    let dir = tempfile::tempdir().unwrap();
    let config = two_by_two_config(dir.path());
    let (clients, _, _) = judges("I grade this a solid pretty-good.");

    let engine = Engine::with_clients(config, clients, artifacts()).unwrap();
    let counts = engine.run().await.unwrap();
    assert_eq!(counts.completed, 2);
    assert_eq!(counts.failed, 0);

    let verdicts = engine.store().all_aggregates();
    assert!(verdicts.iter().all(|v| v.total_score == 0 && v.grade == "F"));
    assert!(verdicts.iter().all(|v| v
        .feedback
        .iter()
        .any(|line| line.contains("parse failure"))));
}

#[tokio::test]
async fn pooled_run_produces_the_same_matrix_as_sequential() {
    let sequential_dir = tempfile::tempdir().unwrap();
    let pooled_dir = tempfile::tempdir().unwrap();

    let sequential_config = two_by_two_config(sequential_dir.path());
    let mut pooled_config = two_by_two_config(pooled_dir.path());
    pooled_config.workers = 3;

    let (clients, _, _) = judges(GOOD_REPLY);
    let sequential = Engine::with_clients(sequential_config.clone(), clients, artifacts()).unwrap();
    sequential.run().await.unwrap();

    let (clients, _, _) = judges(GOOD_REPLY);
    let pooled = Engine::with_clients(pooled_config.clone(), clients, artifacts()).unwrap();
    let counts = pooled.run().await.unwrap();
    assert_eq!(counts.completed, 2);

    let sequential_matrix = MatrixBuilder::from_config(&sequential_config)
        .build("case-1", &sequential.store().all_aggregates());
    let pooled_matrix =
        MatrixBuilder::from_config(&pooled_config).build("case-1", &pooled.store().all_aggregates());
    assert_eq!(sequential_matrix, pooled_matrix);
}

#[tokio::test]
async fn progress_events_cover_every_pending_task() {
    let dir = tempfile::tempdir().unwrap();
    let config = two_by_two_config(dir.path());
    let (clients, _, _) = judges(GOOD_REPLY);

    let seen: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink: ProgressSink = {
        let seen = Arc::clone(&seen);
        Arc::new(move |event| seen.lock().unwrap().push(event))
    };

    let engine = Engine::with_clients(config, clients, artifacts())
        .unwrap()
        .with_progress(sink);
    engine.run().await.unwrap();

    let events = seen.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            ProgressEvent { done: 1, total: 2 },
            ProgressEvent { done: 2, total: 2 }
        ]
    );
}
