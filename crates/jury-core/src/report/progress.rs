//! Progress reporting for evaluation runs. The engine emits done/total in
//! completion order; the console layer consumes via a sink.

use std::sync::Arc;

/// One progress update: how many tasks are done and total count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub done: usize,
    pub total: usize,
}

/// Sink for progress events. The engine calls this each time a task reaches
/// a terminal state, possibly from worker contexts.
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
