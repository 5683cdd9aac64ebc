// SPDX-License-Identifier: MIT
//! In-memory activity events and the forensic-recovery / result-summary
//! shapes that flow between the pipeline, the executor, and the engine
//! (spec §3).

use serde::{Deserialize, Serialize};

/// One streamed event, after the pipeline's timestamp stage has wrapped it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub timestamp: f64,
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,
    #[serde(default)]
    pub is_heartbeat: bool,
}

impl ActivityEvent {
    pub fn new(timestamp: f64, data: serde_json::Value, executor: Option<String>) -> Self {
        Self {
            timestamp,
            data,
            executor,
            is_heartbeat: false,
        }
    }

    /// The raw text this event carries, used for scoring and prompt context.
    /// A string payload is returned verbatim; any other JSON value is
    /// rendered compactly so scoring can still scan for JSON markers.
    pub fn text(&self) -> String {
        match &self.data {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// The classification a forensic recovery produces for a hung/crashed
/// executor (spec §3, §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZombieVerdict {
    Success,
    Partial,
    Dead,
}

/// Result of `Executor::recover` (spec §3).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoveryResult {
    pub success: bool,
    #[serde(default)]
    pub recovered_activity: Vec<ActivityEvent>,
    #[serde(default)]
    pub verdict: Option<ZombieVerdict>,
}

/// Result of the result extractor's scoring pass over an activity log
/// (spec §4.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub result: String,
    pub leading_context: Vec<String>,
    pub trailing_context: Vec<String>,
    pub score: i64,
}

/// The auditor's verdict, extracted from its activity-log tail (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditorVerdict {
    Done,
    Retry,
    Impossible,
}

impl std::fmt::Display for AuditorVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditorVerdict::Done => "DONE",
            AuditorVerdict::Retry => "RETRY",
            AuditorVerdict::Impossible => "IMPOSSIBLE",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
