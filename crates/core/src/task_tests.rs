// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn new_task_starts_created_with_zero_iterations() {
    let t = Task::new(TaskId::new("t-1"), 5, 100.0);
    assert_eq!(t.state, TaskState::Created);
    assert_eq!(t.iteration_count, 0);
    assert!(t.history.is_empty());
}

#[test]
fn record_transition_appends_history_and_bumps_updated_at() {
    let mut t = Task::new(TaskId::new("t-1"), 5, 100.0);
    t.record_transition(TaskState::WorkerExecuting, 101.0, Some("start".into()), Some(42));
    assert_eq!(t.state, TaskState::WorkerExecuting);
    assert_eq!(t.history.len(), 1);
    assert_eq!(t.history[0].reason.as_deref(), Some("start"));
    assert_eq!(t.history[0].pid, Some(42));
    assert_eq!(t.updated_at, 101.0);
}

#[test]
fn history_is_append_only_across_transitions() {
    let mut t = Task::new(TaskId::new("t-1"), 5, 100.0);
    t.record_transition(TaskState::WorkerExecuting, 101.0, None, None);
    t.record_transition(TaskState::AuditPending, 102.0, None, None);
    assert_eq!(t.history.len(), 2);
    assert_eq!(t.history[0].state, TaskState::WorkerExecuting);
    assert_eq!(t.history[1].state, TaskState::AuditPending);
}

#[test]
fn migrate_fills_missing_fields_without_clobbering_present_ones() {
    let mut value = serde_json::json!({
        "state": "WORKER_EXECUTING",
        "iteration_count": 2,
    });
    Task::migrate(&mut value, 500.0);
    assert_eq!(value["state"], "WORKER_EXECUTING");
    assert_eq!(value["iteration_count"], 2);
    assert_eq!(value["max_iterations"], 5);
    assert_eq!(value["history"], serde_json::json!([]));
}

#[test]
fn worker_summary_round_trips_through_set_and_get() {
    let mut t = Task::new(TaskId::new("t-1"), 5, 0.0);
    t.set_worker_summary(
        crate::event::ResultSummary {
            result: "Stockholm".into(),
            leading_context: vec!["thinking...".into()],
            trailing_context: vec!["done.".into()],
            score: 7,
        },
        10.0,
    );
    let summary = t.worker_summary().unwrap();
    assert_eq!(summary.result, "Stockholm");
    assert_eq!(summary.leading_context, vec!["thinking...".to_string()]);
    assert_eq!(summary.trailing_context, vec!["done.".to_string()]);
    assert_eq!(summary.score, 7);
}

#[test]
fn iteration_count_never_exceeds_max_without_explicit_check() {
    let mut t = Task::new(TaskId::new("t-1"), 1, 0.0);
    t.increment_iteration(1.0);
    assert_eq!(t.iteration_count, 1);
    assert!(t.iteration_count <= t.max_iterations);
}
