//! Scripted judge for tests and offline runs. Queued replies are consumed
//! in order; once the queue is empty every call returns the default reply.

use super::{CallOptions, JudgeClient};
use crate::errors::EvalError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug)]
pub enum FakeReply {
    Text(String),
    Error(EvalError),
}

#[derive(Debug)]
pub struct FakeJudge {
    model: String,
    replies: Mutex<Vec<FakeReply>>,
    default_text: String,
    fail_by_default: bool,
    calls: AtomicUsize,
}

impl FakeJudge {
    pub fn new(model: impl Into<String>, default_text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            replies: Mutex::new(Vec::new()),
            default_text: default_text.into(),
            fail_by_default: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// A judge whose every unscripted call fails with a transport error.
    pub fn failing(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            replies: Mutex::new(Vec::new()),
            default_text: String::new(),
            fail_by_default: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .push(FakeReply::Text(text.into()));
    }

    pub fn push_transport_error(&self, message: impl Into<String>) {
        self.replies.lock().unwrap().push(FakeReply::Error(
            EvalError::Transport {
                attempts: 1,
                message: message.into(),
            },
        ));
    }

    pub fn push_error(&self, error: EvalError) {
        self.replies.lock().unwrap().push(FakeReply::Error(error));
    }

    /// Total calls observed, across scripted and default replies.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JudgeClient for FakeJudge {
    async fn call(&self, _prompt: &str, _options: &CallOptions) -> Result<String, EvalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            if self.fail_by_default {
                return Err(EvalError::Transport {
                    attempts: 1,
                    message: "scripted transport failure".into(),
                });
            }
            return Ok(self.default_text.clone());
        }
        match replies.remove(0) {
            FakeReply::Text(text) => Ok(text),
            FakeReply::Error(err) => Err(err),
        }
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "fake"
    }
}
