//! Task enumeration and execution.
//!
//! The engine owns one run: enumerate the (subject, producer, evaluator)
//! docket, skip tasks whose verdicts already exist, execute the rest either
//! in place or on a bounded worker pool, and record every terminal outcome
//! in the ledger.

pub mod aggregate;

use crate::artifacts::ArtifactStore;
use crate::config::EvalConfig;
use crate::errors::EvalError;
use crate::judge::DimensionEvaluator;
use crate::model::{RunCounts, TaskKey, TaskStatus};
use crate::providers::retry::RetryPolicy;
use crate::providers::{client_for, CallOptions, JudgeClient};
use crate::registry::ModelRegistry;
use crate::report::progress::{ProgressEvent, ProgressSink};
use crate::storage::ledger::Ledger;
use crate::storage::ResultStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

/// Every pairing the configuration asks for, subjects outermost, in
/// configuration order. A model never judges its own artifact unless
/// `include_self_evaluation` says so.
pub fn enumerate_tasks(config: &EvalConfig) -> Vec<TaskKey> {
    let mut tasks = Vec::new();
    for subject in &config.subjects {
        for producer in &config.producers {
            for evaluator in config.evaluators() {
                if producer == evaluator && !config.include_self_evaluation {
                    continue;
                }
                tasks.push(TaskKey::new(subject, producer, evaluator));
            }
        }
    }
    tasks
}

/// Terminal state of one executed task.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub key: TaskKey,
    pub status: TaskStatus,
    pub error: Option<String>,
}

/// Cloning an `Engine` is cheap; worker tasks each carry a clone.
#[derive(Clone)]
pub struct Engine {
    config: Arc<EvalConfig>,
    artifacts: Arc<dyn ArtifactStore>,
    clients: Arc<HashMap<String, Arc<dyn JudgeClient>>>,
    store: ResultStore,
    ledger: Arc<Mutex<Ledger>>,
    evaluator: Arc<DimensionEvaluator>,
    progress: Option<ProgressSink>,
}

impl Engine {
    /// Builds an engine with one registry-backed client per evaluator.
    /// Unknown evaluators and missing credentials surface here, before any
    /// task runs.
    pub fn new(
        config: EvalConfig,
        registry: &ModelRegistry,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Result<Self, EvalError> {
        let mut clients: HashMap<String, Arc<dyn JudgeClient>> = HashMap::new();
        for evaluator in config.evaluators() {
            if !clients.contains_key(evaluator) {
                clients.insert(evaluator.clone(), client_for(registry, evaluator)?);
            }
        }
        Self::with_clients(config, clients, artifacts)
    }

    /// Wires an engine around pre-built clients.
    pub fn with_clients(
        config: EvalConfig,
        clients: HashMap<String, Arc<dyn JudgeClient>>,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Result<Self, EvalError> {
        config.validate()?;
        let store = ResultStore::new(config.output_dir.clone());
        let ledger = Ledger::open(store.ledger_path())?;
        let options = CallOptions {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };
        let policy = RetryPolicy::new(
            config.max_retries,
            Duration::from_millis(config.retry_base_delay_ms),
            Duration::from_secs(config.timeout_secs),
        );
        Ok(Self {
            config: Arc::new(config),
            artifacts,
            clients: Arc::new(clients),
            store,
            ledger: Arc::new(Mutex::new(ledger)),
            evaluator: Arc::new(DimensionEvaluator::new(options, policy)),
            progress: None,
        })
    }

    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Executes the docket. Task failures are counted, ledgered and carried
    /// in the returned tallies; only run-level breakage is an `Err`.
    pub async fn run(&self) -> Result<RunCounts, EvalError> {
        let run_id = Uuid::new_v4();
        let mut counts = RunCounts::default();
        let mut pending = Vec::new();
        for key in enumerate_tasks(&self.config) {
            if self.config.cache_enabled && self.store.has_aggregate(&key) {
                tracing::debug!(
                    subject = %key.subject,
                    producer = %key.producer,
                    evaluator = %key.evaluator,
                    "verdict already stored, skipping"
                );
                counts.skipped += 1;
            } else {
                pending.push(key);
            }
        }
        let total = pending.len();
        tracing::info!(
            %run_id,
            tasks = total + counts.skipped,
            pending = total,
            skipped = counts.skipped,
            workers = self.config.workers,
            "starting evaluation run"
        );

        if self.config.workers <= 1 {
            for (index, key) in pending.into_iter().enumerate() {
                let outcome = self.run_task(key).await;
                absorb(&mut counts, &outcome);
                self.emit_progress(index + 1, total);
            }
        } else {
            let semaphore = Arc::new(Semaphore::new(self.config.workers));
            let mut join_set = JoinSet::new();
            for key in pending {
                let permit = Arc::clone(&semaphore)
                    .acquire_owned()
                    .await
                    .map_err(|e| {
                        EvalError::configuration(format!("worker pool closed: {e}"))
                    })?;
                let this = self.clone();
                join_set.spawn(async move {
                    let outcome = this.run_task(key).await;
                    drop(permit);
                    outcome
                });
            }
            let mut done = 0usize;
            while let Some(joined) = join_set.join_next().await {
                match joined {
                    Ok(outcome) => absorb(&mut counts, &outcome),
                    Err(err) => {
                        tracing::error!(error = %err, "judging task panicked");
                        counts.failed += 1;
                    }
                }
                done += 1;
                self.emit_progress(done, total);
            }
        }

        tracing::info!(
            %run_id,
            completed = counts.completed,
            failed = counts.failed,
            skipped = counts.skipped,
            "evaluation run finished"
        );
        Ok(counts)
    }

    async fn run_task(&self, key: TaskKey) -> TaskOutcome {
        tracing::debug!(
            subject = %key.subject,
            producer = %key.producer,
            evaluator = %key.evaluator,
            "task running"
        );
        match self.execute(&key).await {
            Ok(()) => {
                self.record(&key, TaskStatus::Completed, None);
                TaskOutcome {
                    key,
                    status: TaskStatus::Completed,
                    error: None,
                }
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(
                    subject = %key.subject,
                    producer = %key.producer,
                    evaluator = %key.evaluator,
                    error = %message,
                    "task failed"
                );
                // A task that could not persist its verdict stays out of the
                // ledger entirely, so the next run re-attempts it.
                if !err.is_persistence() {
                    self.record(&key, TaskStatus::Failed, Some(message.clone()));
                }
                TaskOutcome {
                    key,
                    status: TaskStatus::Failed,
                    error: Some(message),
                }
            }
        }
    }

    /// One full task: every configured dimension against one artifact, then
    /// the aggregate. Dimension and raw files land as they are produced so a
    /// mid-task crash loses at most unaggregated partials.
    async fn execute(&self, key: &TaskKey) -> Result<(), EvalError> {
        let client = self.clients.get(&key.evaluator).ok_or_else(|| {
            EvalError::configuration(format!("no client for evaluator '{}'", key.evaluator))
        })?;
        let artifact = self.artifacts.get(&key.subject, &key.producer)?;

        let mut results = Vec::with_capacity(self.config.dimensions.len());
        for spec in &self.config.dimensions {
            let evaluated = self
                .evaluator
                .evaluate(client.as_ref(), *spec, &key.subject, &artifact)
                .await?;
            self.store.put_raw(key, spec.name, &evaluated.raw)?;
            self.store.put_dimension(key, &evaluated.result)?;
            results.push(evaluated.result);
        }

        let verdict = aggregate::aggregate(key, &self.config.dimensions, results);
        self.store.put_aggregate(key, &verdict)?;
        tracing::info!(
            subject = %key.subject,
            producer = %key.producer,
            evaluator = %key.evaluator,
            total = verdict.total_score,
            max = verdict.max_total_score,
            grade = %verdict.grade,
            "task completed"
        );
        Ok(())
    }

    fn record(&self, key: &TaskKey, status: TaskStatus, error: Option<String>) {
        let mut ledger = self.ledger.lock().unwrap();
        if let Err(err) = ledger.record(key, status, error) {
            tracing::warn!(error = %err, "ledger write failed");
        }
    }

    fn emit_progress(&self, done: usize, total: usize) {
        if let Some(sink) = &self.progress {
            sink(ProgressEvent { done, total });
        }
    }
}

fn absorb(counts: &mut RunCounts, outcome: &TaskOutcome) {
    match outcome.status {
        TaskStatus::Completed => counts.completed += 1,
        _ => counts.failed += 1,
    }
}
