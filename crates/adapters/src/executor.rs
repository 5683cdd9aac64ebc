// SPDX-License-Identifier: MIT
//! The polymorphic executor abstraction (spec §4.1), grounded on the
//! teacher's `AgentAdapter` trait (`oj-adapters/src/agent/mod.rs`),
//! generalized from tmux-session handling to a plain subprocess/HTTP split.

use crate::error::ExecuteError;
use async_trait::async_trait;
use futures::Stream;
use oneshot_core::{RecoveryResult, TaskId};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Static facts about an executor implementation, consumed by the registry
/// and by the Engine's recovery strategy selection (spec §4.1,
/// supplemented from `original_source/src/oneshot/providers/executor_registry.py`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorMetadata {
    pub name: String,
    /// Whether `recover()` can fall back to walking git history in the
    /// task's working directory.
    pub captures_git: bool,
    /// Surfaced by the CLI's `--executor` help text; model-selection
    /// *policy* itself remains a non-goal.
    pub supports_model_selection: bool,
}

/// A lazy, ordered stream of raw output lines from one `execute` call. A
/// line may be a bare log line or a JSON object serialized to one line —
/// downstream pipeline stages do not assume which (spec §4.1 contract).
///
/// Dropping this value without fully draining it still guarantees the
/// underlying child process is terminated: implementations build it over a
/// `tokio::process::Child` created with `.kill_on_drop(true)`, the same
/// guarantee the teacher's `run_with_timeout` leans on.
pub struct ExecutionStream {
    inner: Pin<Box<dyn Stream<Item = Result<String, ExecuteError>> + Send>>,
}

impl ExecutionStream {
    pub fn new(inner: impl Stream<Item = Result<String, ExecuteError>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(inner),
        }
    }
}

impl Stream for ExecutionStream {
    type Item = Result<String, ExecuteError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Launches and streams one agent invocation; provides forensic recovery
/// from its own on-disk state (spec §4.1).
#[async_trait]
pub trait Executor: Send + Sync + 'static {
    /// Start the underlying process or open the HTTP stream. Fails with
    /// `LaunchError` if the binary/endpoint is unreachable — distinct from a
    /// failure mid-stream, which surfaces as an `Err` item on the stream.
    async fn execute(&self, prompt: &str) -> Result<ExecutionStream, ExecuteError>;

    /// Side-effect-free forensic read of on-disk state a crashed or hung
    /// agent left behind (spec §4.1).
    async fn recover(&self, task_id: &TaskId) -> RecoveryResult;

    fn metadata(&self) -> ExecutorMetadata;
}
