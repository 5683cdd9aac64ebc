// SPDX-License-Identifier: MIT
//! The task-state record persisted by the durable context (spec §3).

use crate::event::ResultSummary;
use crate::id::TaskId;
use crate::state::TaskState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current schema version for [`Task`]. Bumping this and adding a branch to
/// `Task::migrate` is how load-time migration (spec §4.3) is implemented.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// One entry in a task's append-only transition history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub state: TaskState,
    pub ts: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// The full persisted state of one task run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub version: u32,
    #[serde(default)]
    pub oneshot_id: Option<String>,
    pub id: TaskId,
    pub state: TaskState,
    pub iteration_count: u32,
    pub max_iterations: u32,
    pub created_at: f64,
    pub updated_at: f64,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub worker_result: Option<String>,
    /// Context events captured immediately before the winning result event
    /// (spec §4.5's ≤2-event window), persisted so a resumed run can rebuild
    /// the exact Auditor prompt the original run would have sent.
    #[serde(default)]
    pub worker_leading_context: Vec<String>,
    #[serde(default)]
    pub worker_trailing_context: Vec<String>,
    #[serde(default)]
    pub worker_score: i64,
    #[serde(default)]
    pub auditor_result: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub variables: HashMap<String, serde_json::Value>,
}

impl Task {
    /// Create a brand-new task in the `CREATED` state.
    pub fn new(id: TaskId, max_iterations: u32, now: f64) -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            oneshot_id: None,
            id,
            state: TaskState::Created,
            iteration_count: 0,
            max_iterations,
            created_at: now,
            updated_at: now,
            history: Vec::new(),
            worker_result: None,
            worker_leading_context: Vec::new(),
            worker_trailing_context: Vec::new(),
            worker_score: 0,
            auditor_result: None,
            metadata: HashMap::new(),
            variables: HashMap::new(),
        }
    }

    /// Record a state transition: updates `state`, appends to `history`,
    /// bumps `updated_at`. Does not persist — callers go through the
    /// durable-context writer for that (spec §4.3).
    pub fn record_transition(
        &mut self,
        state: TaskState,
        now: f64,
        reason: Option<String>,
        pid: Option<u32>,
    ) {
        self.state = state;
        self.history.push(HistoryEntry {
            state,
            ts: now,
            pid,
            reason,
        });
        self.updated_at = now;
    }

    pub fn set_variable(&mut self, key: impl Into<String>, value: serde_json::Value, now: f64) {
        self.variables.insert(key.into(), value);
        self.updated_at = now;
    }

    pub fn get_variable(&self, key: &str) -> Option<&serde_json::Value> {
        self.variables.get(key)
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: serde_json::Value, now: f64) {
        self.metadata.insert(key.into(), value);
        self.updated_at = now;
    }

    pub fn get_metadata(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }

    pub fn set_worker_result(&mut self, result: impl Into<String>, now: f64) {
        self.worker_result = Some(result.into());
        self.updated_at = now;
    }

    /// Persist a full Result Extractor summary: the winning result text plus
    /// the context events either side of it and its score (spec §4.5). The
    /// context vectors are what let a resumed run rebuild the exact Auditor
    /// prompt the original run would have sent.
    pub fn set_worker_summary(&mut self, summary: ResultSummary, now: f64) {
        self.worker_result = Some(summary.result);
        self.worker_leading_context = summary.leading_context;
        self.worker_trailing_context = summary.trailing_context;
        self.worker_score = summary.score;
        self.updated_at = now;
    }

    /// Rebuild the summary `set_worker_summary` persisted, for handing back
    /// to the Auditor prompt generator.
    pub fn worker_summary(&self) -> Option<ResultSummary> {
        let result = self.worker_result.clone()?;
        Some(ResultSummary {
            result,
            leading_context: self.worker_leading_context.clone(),
            trailing_context: self.worker_trailing_context.clone(),
            score: self.worker_score,
        })
    }

    pub fn set_auditor_result(&mut self, result: impl Into<String>, now: f64) {
        self.auditor_result = Some(result.into());
        self.updated_at = now;
    }

    /// Increment `iteration_count`. Callers must separately check the result
    /// against `max_iterations` (spec §4.6 `execute_worker`).
    pub fn increment_iteration(&mut self, now: f64) {
        self.iteration_count += 1;
        self.updated_at = now;
    }

    /// Fill in any required field missing from an older-schema JSON document
    /// (spec §4.3 "Load-time migration"). `value` is mutated in place.
    pub fn migrate(value: &mut serde_json::Value, now: f64) {
        let Some(obj) = value.as_object_mut() else {
            return;
        };
        obj.entry("version").or_insert(serde_json::json!(1));
        obj.entry("oneshot_id").or_insert(serde_json::Value::Null);
        obj.entry("state").or_insert(serde_json::json!("CREATED"));
        obj.entry("iteration_count").or_insert(serde_json::json!(0));
        obj.entry("max_iterations").or_insert(serde_json::json!(5));
        obj.entry("created_at").or_insert(serde_json::json!(now));
        obj.entry("updated_at").or_insert(serde_json::json!(now));
        obj.entry("history").or_insert(serde_json::json!([]));
        obj.entry("worker_result").or_insert(serde_json::Value::Null);
        obj.entry("worker_leading_context").or_insert(serde_json::json!([]));
        obj.entry("worker_trailing_context").or_insert(serde_json::json!([]));
        obj.entry("worker_score").or_insert(serde_json::json!(0));
        obj.entry("auditor_result").or_insert(serde_json::Value::Null);
        obj.entry("metadata").or_insert(serde_json::json!({}));
        obj.entry("variables").or_insert(serde_json::json!({}));
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
