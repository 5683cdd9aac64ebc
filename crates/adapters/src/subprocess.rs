// SPDX-License-Identifier: MIT
//! `SubprocessExecutor`: the agent-is-a-CLI variant of [`Executor`], grounded
//! on the teacher's `run_with_timeout` (`oj-adapters/src/subprocess.rs`) for
//! the kill-on-drop termination guarantee, and on `ClaudeAgentAdapter`
//! (`oj-adapters/src/agent/claude.rs`) for the spawn/stream/cleanup shape.

use crate::error::ExecuteError;
use crate::executor::{ExecutionStream, Executor, ExecutorMetadata};
use async_trait::async_trait;
use oneshot_core::{ActivityEvent, RecoveryResult, TaskId, ZombieVerdict};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

/// Default grace period between a graceful stdin-close and a force-kill
/// (spec §4.1: "typically 5 seconds").
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SubprocessExecutorConfig {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
    pub grace_period: Duration,
    /// Timestamp the owning task was created; used by `recover()`'s git
    /// fallback to decide whether a commit postdates this run.
    pub created_at: f64,
    /// Path to the agent's own session-history file, if it keeps one
    /// (spec §4.1 forensic strategy 1).
    pub session_history_path: Option<PathBuf>,
    /// Whether `recover()` may fall back to walking git history.
    pub captures_git: bool,
}

pub struct SubprocessExecutor {
    config: SubprocessExecutorConfig,
}

impl SubprocessExecutor {
    pub fn new(config: SubprocessExecutorConfig) -> Self {
        Self { config }
    }

    /// Strategy 1: scan the agent's own session-history file for a
    /// completion marker. A file that parses but never mentions completion
    /// is `partial`; a missing or empty file falls through to the git
    /// strategy.
    fn recover_from_session_history(&self) -> Option<RecoveryResult> {
        let path = self.config.session_history_path.as_ref()?;
        let contents = std::fs::read_to_string(path).ok()?;
        if contents.trim().is_empty() {
            return None;
        }
        let mut recovered = Vec::new();
        let mut saw_completion = false;
        for (i, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: serde_json::Value =
                serde_json::from_str(line).unwrap_or_else(|_| serde_json::json!(line));
            let text = value.to_string();
            if text.to_ascii_lowercase().contains("\"subtype\":\"success\"")
                || text.to_ascii_uppercase().contains("DONE")
            {
                saw_completion = true;
            }
            recovered.push(ActivityEvent::new(i as f64, value, Some(self.config.name.clone())));
        }
        let verdict = if saw_completion {
            ZombieVerdict::Success
        } else {
            ZombieVerdict::Partial
        };
        Some(RecoveryResult {
            success: matches!(verdict, ZombieVerdict::Success),
            recovered_activity: recovered,
            verdict: Some(verdict),
        })
    }

    /// Strategy 2: a commit authored after the task started is a success
    /// signal (spec §4.1).
    fn recover_from_git(&self) -> Option<RecoveryResult> {
        if !self.config.captures_git {
            return None;
        }
        let repo = git2::Repository::discover(&self.config.cwd).ok()?;
        let mut revwalk = repo.revwalk().ok()?;
        revwalk.push_head().ok()?;
        let created_at = self.config.created_at as i64;
        for oid in revwalk.take(5).filter_map(Result::ok) {
            if let Ok(commit) = repo.find_commit(oid) {
                if commit.time().seconds() > created_at {
                    return Some(RecoveryResult {
                        success: true,
                        recovered_activity: Vec::new(),
                        verdict: Some(ZombieVerdict::Success),
                    });
                }
            }
        }
        Some(RecoveryResult {
            success: false,
            recovered_activity: Vec::new(),
            verdict: Some(ZombieVerdict::Dead),
        })
    }
}

#[async_trait]
impl Executor for SubprocessExecutor {
    async fn execute(&self, prompt: &str) -> Result<ExecutionStream, ExecuteError> {
        let mut cmd = Command::new(&self.config.command);
        cmd.args(&self.config.args)
            .current_dir(&self.config.cwd)
            .envs(self.config.env.iter().cloned())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| ExecuteError::LaunchError(format!("{}: {e}", self.config.command)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|e| ExecuteError::LaunchError(e.to_string()))?;
            stdin
                .shutdown()
                .await
                .map_err(|e| ExecuteError::LaunchError(e.to_string()))?;
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExecuteError::LaunchError("child has no stdout".into()))?;
        let grace_period = self.config.grace_period;

        let stream = async_stream::stream! {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => yield Ok(line),
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(ExecuteError::Crashed(e.to_string()));
                        break;
                    }
                }
            }
            match tokio::time::timeout(grace_period, child.wait()).await {
                Ok(_) => {}
                Err(_) => {
                    let _ = child.start_kill();
                }
            }
        };

        Ok(ExecutionStream::new(stream))
    }

    async fn recover(&self, _task_id: &TaskId) -> RecoveryResult {
        if let Some(result) = self.recover_from_session_history() {
            return result;
        }
        if let Some(result) = self.recover_from_git() {
            return result;
        }
        RecoveryResult {
            success: false,
            recovered_activity: Vec::new(),
            verdict: Some(ZombieVerdict::Dead),
        }
    }

    fn metadata(&self) -> ExecutorMetadata {
        ExecutorMetadata {
            name: self.config.name.clone(),
            captures_git: self.config.captures_git,
            supports_model_selection: true,
        }
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
