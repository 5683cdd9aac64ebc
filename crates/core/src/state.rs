// SPDX-License-Identifier: MIT
//! Task state machine: the authoritative transition table and next-action
//! selector (spec §4.4).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A task's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Created,
    WorkerExecuting,
    AuditPending,
    AuditorExecuting,
    ReiterationPending,
    RecoveryPending,
    Completed,
    Rejected,
    Failed,
    Interrupted,
}

impl TaskState {
    /// Terminal states have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Rejected | TaskState::Failed | TaskState::Interrupted
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Created => "CREATED",
            TaskState::WorkerExecuting => "WORKER_EXECUTING",
            TaskState::AuditPending => "AUDIT_PENDING",
            TaskState::AuditorExecuting => "AUDITOR_EXECUTING",
            TaskState::ReiterationPending => "REITERATION_PENDING",
            TaskState::RecoveryPending => "RECOVERY_PENDING",
            TaskState::Completed => "COMPLETED",
            TaskState::Rejected => "REJECTED",
            TaskState::Failed => "FAILED",
            TaskState::Interrupted => "INTERRUPTED",
        };
        write!(f, "{s}")
    }
}

/// An event that can be fed into the transition table alongside a current
/// state to produce a next state. Strings, not a closed enum, because the
/// event vocabulary is small but some events (`zombie_*`) are parameterized
/// by a verdict computed elsewhere; keeping them as `&'static str` keeps the
/// transition table a single flat match instead of two parallel enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionEvent {
    Start,
    Success,
    Crash,
    Inactivity,
    Interrupt,
    Next,
    Done,
    Retry,
    Impossible,
    MaxIterations,
    ZombieSuccess,
    ZombiePartial,
    ZombieDead,
}

impl fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransitionEvent::Start => "start",
            TransitionEvent::Success => "success",
            TransitionEvent::Crash => "crash",
            TransitionEvent::Inactivity => "inactivity",
            TransitionEvent::Interrupt => "interrupt",
            TransitionEvent::Next => "next",
            TransitionEvent::Done => "done",
            TransitionEvent::Retry => "retry",
            TransitionEvent::Impossible => "impossible",
            TransitionEvent::MaxIterations => "max_iterations",
            TransitionEvent::ZombieSuccess => "zombie_success",
            TransitionEvent::ZombiePartial => "zombie_partial",
            TransitionEvent::ZombieDead => "zombie_dead",
        };
        write!(f, "{s}")
    }
}

/// Raised when a (state, event) pair has no entry in the authoritative table.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid transition: {state} + {event}")]
pub struct InvalidTransition {
    pub state: TaskState,
    pub event: TransitionEvent,
}

/// Look up the next state for a (current state, event) pair against the
/// authoritative table in spec §4.4. Any pair not listed is invalid.
pub fn transition(state: TaskState, event: TransitionEvent) -> Result<TaskState, InvalidTransition> {
    use TaskState::*;
    use TransitionEvent::*;

    let next = match (state, event) {
        (Created, Start) => WorkerExecuting,
        (Created, Interrupt) => Interrupted,

        (WorkerExecuting, Success) => AuditPending,
        (WorkerExecuting, Crash) => RecoveryPending,
        (WorkerExecuting, Inactivity) => RecoveryPending,
        (WorkerExecuting, Interrupt) => Interrupted,

        (AuditPending, Next) => AuditorExecuting,
        (AuditPending, Interrupt) => Interrupted,

        (AuditorExecuting, Done) => Completed,
        (AuditorExecuting, Retry) => ReiterationPending,
        (AuditorExecuting, Impossible) => Rejected,
        (AuditorExecuting, Crash) => Failed,
        (AuditorExecuting, Inactivity) => Failed,
        (AuditorExecuting, Interrupt) => Interrupted,

        (ReiterationPending, Next) => WorkerExecuting,
        (ReiterationPending, MaxIterations) => Failed,
        (ReiterationPending, Interrupt) => Interrupted,

        (RecoveryPending, ZombieSuccess) => AuditPending,
        (RecoveryPending, ZombiePartial) => ReiterationPending,
        (RecoveryPending, ZombieDead) => Failed,
        (RecoveryPending, Interrupt) => Interrupted,

        _ => return Err(InvalidTransition { state, event }),
    };
    Ok(next)
}

/// The action the Engine should take for a given state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAction {
    RunWorker,
    RunAuditor,
    Recover,
    Exit { reason: TaskState },
    Wait,
}

/// Given the current state, decide what the Engine should do next (spec §4.4).
pub fn next_action(state: TaskState) -> NextAction {
    match state {
        TaskState::Created | TaskState::ReiterationPending => NextAction::RunWorker,
        TaskState::AuditPending => NextAction::RunAuditor,
        TaskState::RecoveryPending => NextAction::Recover,
        TaskState::Completed
        | TaskState::Rejected
        | TaskState::Failed
        | TaskState::Interrupted => NextAction::Exit { reason: state },
        TaskState::WorkerExecuting | TaskState::AuditorExecuting => NextAction::Wait,
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
