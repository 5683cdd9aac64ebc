// SPDX-License-Identifier: MIT
//! Engine / Orchestrator (C7, spec §4.6): the `run` loop that drives one
//! task from `CREATED` (or wherever it was last persisted) to a terminal
//! state, dispatching to the Executor through the streaming pipeline and
//! persisting every transition through the durable context.

use crate::error::RuntimeError;
use crate::{activity_filter, extractor, prompts, verdict};
use futures::StreamExt;
use oneshot_core::{
    next_action, transition, ActivityEvent, Clock, NextAction, TaskId, TaskState, TransitionEvent,
    ZombieVerdict,
};
use oneshot_executor::{pipeline, ExecuteError, Executor};
use oneshot_storage::{ActivityLogWriter, DurableContext};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How often the execute-scope pump checks the interrupted flag while
/// otherwise waiting on the next pipeline item (spec §5 cancellation
/// semantics: "checked at every loop iteration").
const INTERRUPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// The literal task text, e.g. "What is the capital of Sweden?".
    pub task: String,
    pub inactivity_timeout: Duration,
    pub poll_interval: Duration,
    pub prompt_config: prompts::PromptConfig,
    pub keep_log: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            task: String::new(),
            inactivity_timeout: Duration::from_secs(120),
            poll_interval: pipeline::DEFAULT_POLL_INTERVAL,
            prompt_config: prompts::PromptConfig::default(),
            keep_log: false,
        }
    }
}

enum ExecuteOutcome {
    Success(Vec<ActivityEvent>),
    Inactivity,
    Crash(String),
    Interrupted,
}

/// Drives one task. Owns the durable context exclusively for the duration
/// of the run (spec §3 ownership).
pub struct Engine<C: Clock> {
    task_id: TaskId,
    context: DurableContext,
    activity_log: Arc<Mutex<ActivityLogWriter>>,
    activity_log_path: PathBuf,
    worker_executor: Arc<dyn Executor>,
    auditor_executor: Arc<dyn Executor>,
    clock: C,
    config: EngineConfig,
    interrupted: Arc<AtomicBool>,
    /// `clock.now()`'s bit pattern at the last loop iteration, read by the
    /// orchestrator's idle watchdog without needing a lock on the Engine
    /// itself (spec §4.7).
    last_activity: Arc<AtomicU64>,
}

impl<C: Clock> Engine<C> {
    pub fn new(
        task_id: TaskId,
        context: DurableContext,
        activity_log_path: PathBuf,
        worker_executor: Arc<dyn Executor>,
        auditor_executor: Arc<dyn Executor>,
        clock: C,
        config: EngineConfig,
    ) -> Result<Self, RuntimeError> {
        let activity_log = ActivityLogWriter::open(&activity_log_path)?;
        let last_activity = Arc::new(AtomicU64::new(clock.now().to_bits()));
        Ok(Self {
            task_id,
            context,
            activity_log: Arc::new(Mutex::new(activity_log)),
            activity_log_path,
            worker_executor,
            auditor_executor,
            clock,
            config,
            interrupted: Arc::new(AtomicBool::new(false)),
            last_activity,
        })
    }

    /// A handle the caller can flip from a signal handler to request
    /// cooperative cancellation (spec §5 "SIGINT sets an interrupted flag").
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    /// A handle to this Engine's last-progress timestamp, for the
    /// orchestrator's global idle watchdog (spec §4.7).
    pub fn activity_handle(&self) -> Arc<AtomicU64> {
        self.last_activity.clone()
    }

    pub fn context(&self) -> &DurableContext {
        &self.context
    }

    /// Run until a terminal state is reached. Returns `Ok(true)` iff the
    /// task ended `COMPLETED`.
    pub async fn run(&mut self) -> Result<bool, RuntimeError> {
        loop {
            self.last_activity.store(self.clock.now().to_bits(), Ordering::Relaxed);

            if self.interrupted.load(Ordering::Relaxed) {
                let now = self.clock.now();
                let next = transition(self.context.get_state(), TransitionEvent::Interrupt)?;
                self.context.set_state(next, now, Some("interrupt".into()), None)?;
                continue;
            }

            match next_action(self.context.get_state()) {
                NextAction::Exit { reason } => {
                    self.cleanup(reason)?;
                    return Ok(reason == TaskState::Completed);
                }
                NextAction::RunWorker => self.execute_worker().await?,
                NextAction::RunAuditor => self.execute_auditor().await?,
                NextAction::Recover => self.execute_recovery().await?,
                NextAction::Wait => unreachable!(
                    "single-task synchronous engine never observes an executing state at loop top"
                ),
            }
        }
    }

    async fn execute_worker(&mut self) -> Result<(), RuntimeError> {
        let from_reiteration = self.context.get_state() == TaskState::ReiterationPending;

        if from_reiteration {
            let now = self.clock.now();
            let count = self.context.increment_iteration(now)?;
            if count > self.context.task().max_iterations {
                let next = transition(TaskState::ReiterationPending, TransitionEvent::MaxIterations)?;
                self.context
                    .set_state(next, self.clock.now(), Some("max_iterations".into()), None)?;
                return Ok(());
            }
        }

        let prompt = if from_reiteration {
            let feedback = self.context.get_auditor_result().unwrap_or("").to_string();
            prompts::worker_reiteration(&self.config.task, &feedback, self.config.prompt_config)
        } else {
            prompts::worker_first_iteration(&self.config.task, self.config.prompt_config)
        };

        let entry_event = if from_reiteration {
            TransitionEvent::Next
        } else {
            TransitionEvent::Start
        };
        let next_state = transition(self.context.get_state(), entry_event)?;
        self.context
            .set_state(next_state, self.clock.now(), None, Some(std::process::id()))?;

        match self.pump(self.worker_executor.clone(), &prompt).await {
            ExecuteOutcome::Success(events) => {
                let filtered = activity_filter::filter_events(&events);
                if let Some(summary) = extractor::extract_result(&filtered) {
                    self.context.set_worker_summary(summary, self.clock.now())?;
                }
                let next = transition(self.context.get_state(), TransitionEvent::Success)?;
                self.context.set_state(next, self.clock.now(), None, None)?;
            }
            ExecuteOutcome::Inactivity => {
                let next = transition(self.context.get_state(), TransitionEvent::Inactivity)?;
                self.context
                    .set_state(next, self.clock.now(), Some("inactivity".into()), None)?;
            }
            ExecuteOutcome::Crash(reason) => {
                let next = transition(self.context.get_state(), TransitionEvent::Crash)?;
                self.context.set_state(next, self.clock.now(), Some(reason), None)?;
            }
            ExecuteOutcome::Interrupted => {
                let next = transition(self.context.get_state(), TransitionEvent::Interrupt)?;
                self.context
                    .set_state(next, self.clock.now(), Some("interrupt".into()), None)?;
            }
        }
        Ok(())
    }

    async fn execute_auditor(&mut self) -> Result<(), RuntimeError> {
        let summary = self.context.get_worker_summary().unwrap_or_else(|| oneshot_core::ResultSummary {
            result: self.context.get_worker_result().unwrap_or("").to_string(),
            leading_context: Vec::new(),
            trailing_context: Vec::new(),
            score: 0,
        });
        let prompt = prompts::auditor(&self.config.task, &summary, self.config.prompt_config);

        let next_state = transition(self.context.get_state(), TransitionEvent::Next)?;
        self.context
            .set_state(next_state, self.clock.now(), None, Some(std::process::id()))?;

        match self.pump(self.auditor_executor.clone(), &prompt).await {
            ExecuteOutcome::Success(events) => {
                let lines: Vec<String> = events.iter().map(ActivityEvent::text).collect();
                self.context
                    .set_auditor_result(lines.join("\n"), self.clock.now())?;
                let (verdict, unparseable) = verdict::extract_verdict(&lines);
                if unparseable {
                    tracing::warn!(task_id = %self.task_id, "auditor verdict unparseable, defaulting to DONE");
                }
                let event = match verdict {
                    oneshot_core::AuditorVerdict::Done => TransitionEvent::Done,
                    oneshot_core::AuditorVerdict::Retry => TransitionEvent::Retry,
                    oneshot_core::AuditorVerdict::Impossible => TransitionEvent::Impossible,
                };
                let next = transition(self.context.get_state(), event)?;
                let reason = if unparseable { Some("verdict_unparseable".to_string()) } else { None };
                self.context.set_state(next, self.clock.now(), reason, None)?;
            }
            // Auditor inactivity or crash is fatal (spec §4.6 key asymmetry).
            ExecuteOutcome::Inactivity => {
                let next = transition(self.context.get_state(), TransitionEvent::Inactivity)?;
                self.context
                    .set_state(next, self.clock.now(), Some("inactivity".into()), None)?;
            }
            ExecuteOutcome::Crash(reason) => {
                let next = transition(self.context.get_state(), TransitionEvent::Crash)?;
                self.context.set_state(next, self.clock.now(), Some(reason), None)?;
            }
            ExecuteOutcome::Interrupted => {
                let next = transition(self.context.get_state(), TransitionEvent::Interrupt)?;
                self.context
                    .set_state(next, self.clock.now(), Some("interrupt".into()), None)?;
            }
        }
        Ok(())
    }

    async fn execute_recovery(&mut self) -> Result<(), RuntimeError> {
        let recovery = self.worker_executor.recover(&self.task_id).await;
        let zombie_verdict = recovery.verdict.unwrap_or(ZombieVerdict::Dead);

        if !recovery.recovered_activity.is_empty() {
            let filtered = activity_filter::filter_events(&recovery.recovered_activity);
            if let Some(summary) = extractor::extract_result(&filtered) {
                self.context.set_worker_summary(summary, self.clock.now())?;
            }
        }

        let event = match zombie_verdict {
            ZombieVerdict::Success => TransitionEvent::ZombieSuccess,
            ZombieVerdict::Partial => TransitionEvent::ZombiePartial,
            ZombieVerdict::Dead => TransitionEvent::ZombieDead,
        };
        let next = transition(self.context.get_state(), event)?;
        self.context
            .set_state(next, self.clock.now(), Some(format!("{event}")), None)?;
        Ok(())
    }

    /// Open an `execute` scope against `executor`, pump its output through
    /// the streaming pipeline, and race the pump against the interrupted
    /// flag (spec §5 cancellation semantics).
    async fn pump(&self, executor: Arc<dyn Executor>, prompt: &str) -> ExecuteOutcome {
        let raw = match executor.execute(prompt).await {
            Ok(stream) => stream,
            Err(e) => return ExecuteOutcome::Crash(e.to_string()),
        };

        let executor_name = executor.metadata().name;
        let log = self.activity_log.clone();
        let sink = move |event: &ActivityEvent| {
            log.lock().append(event).map_err(|e| std::io::Error::other(e.to_string()))
        };

        let built = pipeline::build(
            raw,
            self.clock.clone(),
            Some(executor_name),
            self.config.inactivity_timeout,
            self.config.poll_interval,
            sink,
        );
        let mut stream = Box::pin(built);
        let mut collected = Vec::new();

        loop {
            if self.interrupted.load(Ordering::Relaxed) {
                return ExecuteOutcome::Interrupted;
            }
            tokio::select! {
                item = stream.next() => {
                    match item {
                        Some(Ok(event)) => collected.push(event),
                        Some(Err(ExecuteError::InactivityTimeout { .. })) => return ExecuteOutcome::Inactivity,
                        Some(Err(e)) => return ExecuteOutcome::Crash(e.to_string()),
                        None => return ExecuteOutcome::Success(collected),
                    }
                }
                _ = tokio::time::sleep(INTERRUPT_POLL_INTERVAL) => {}
            }
        }
    }

    /// On successful completion, delete the activity log unless `keep_log`
    /// is set; any other terminal state retains it (spec §4.6).
    fn cleanup(&mut self, reason: TaskState) -> Result<(), RuntimeError> {
        if reason == TaskState::Completed && !self.config.keep_log {
            match std::fs::remove_file(&self.activity_log_path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(error = %e, "failed to remove activity log on cleanup"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
