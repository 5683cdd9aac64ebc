// SPDX-License-Identifier: MIT
//! `FakeExecutor`: a deterministic, in-memory stand-in for [`Executor`] used
//! by this crate's own tests and re-exported (behind `test-support`) for
//! the engine and integration tests — grounded on the teacher's
//! `FakeAgentAdapter` (`oj-adapters/src/agent/fake.rs`).

use crate::error::ExecuteError;
use crate::executor::{ExecutionStream, Executor, ExecutorMetadata};
use async_trait::async_trait;
use oneshot_core::{RecoveryResult, TaskId};
use parking_lot::Mutex;
use std::sync::Arc;

/// One recorded `execute` invocation, for assertions in tests that drive a
/// `FakeExecutor` through a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteCall {
    pub prompt: String,
}

/// One scripted `execute()` outcome.
enum Scripted {
    Lines(Vec<String>),
    Error(ExecuteError),
    /// Yields no lines and never completes, simulating a hung child process
    /// that the inactivity guard must catch.
    Hang,
}

struct Inner {
    /// Queue of scripted responses, one per `execute()` call, in order.
    scripted: Vec<Scripted>,
    scripted_recovery: RecoveryResult,
    calls: Vec<ExecuteCall>,
}

/// Builder-style fake: queue up the lines each successive `execute()` call
/// should yield, then hand it to code under test as an `Arc<dyn Executor>`.
#[derive(Clone)]
pub struct FakeExecutor {
    name: String,
    inner: Arc<Mutex<Inner>>,
}

impl FakeExecutor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Arc::new(Mutex::new(Inner {
                scripted: Vec::new(),
                scripted_recovery: RecoveryResult::default(),
                calls: Vec::new(),
            })),
        }
    }

    /// Queue a successful `execute()` call that yields `lines` in order.
    pub fn push_lines(&self, lines: Vec<impl Into<String>>) {
        self.inner
            .lock()
            .scripted
            .push(Scripted::Lines(lines.into_iter().map(Into::into).collect()));
    }

    /// Queue an `execute()` call that fails immediately with `LaunchError`.
    pub fn push_launch_error(&self, message: impl Into<String>) {
        self.inner.lock().scripted.push(Scripted::Error(ExecuteError::LaunchError(message.into())));
    }

    /// Queue an `execute()` call whose stream never produces a line and
    /// never completes, for exercising the inactivity guard end to end.
    pub fn push_hang(&self) {
        self.inner.lock().scripted.push(Scripted::Hang);
    }

    pub fn set_recovery(&self, recovery: RecoveryResult) {
        self.inner.lock().scripted_recovery = recovery;
    }

    pub fn calls(&self) -> Vec<ExecuteCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl Executor for FakeExecutor {
    async fn execute(&self, prompt: &str) -> Result<ExecutionStream, ExecuteError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ExecuteCall {
            prompt: prompt.to_string(),
        });
        if inner.scripted.is_empty() {
            return Ok(ExecutionStream::new(futures::stream::iter(Vec::new())));
        }
        let next = inner.scripted.remove(0);
        match next {
            Scripted::Lines(lines) => Ok(ExecutionStream::new(futures::stream::iter(
                lines.into_iter().map(Ok),
            ))),
            Scripted::Error(e) => Err(e),
            Scripted::Hang => Ok(ExecutionStream::new(futures::stream::pending())),
        }
    }

    async fn recover(&self, _task_id: &TaskId) -> RecoveryResult {
        self.inner.lock().scripted_recovery.clone()
    }

    fn metadata(&self) -> ExecutorMetadata {
        ExecutorMetadata {
            name: self.name.clone(),
            captures_git: false,
            supports_model_selection: false,
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
