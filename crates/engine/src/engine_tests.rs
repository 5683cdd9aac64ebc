// SPDX-License-Identifier: MIT

use super::*;
use oneshot_core::{FakeClock, TaskId};
use oneshot_executor::FakeExecutor;
use oneshot_storage::context::FsContextWriter;
use tempfile::tempdir;

fn build_engine(
    dir: &std::path::Path,
    worker: Arc<FakeExecutor>,
    auditor: Arc<FakeExecutor>,
    max_iterations: u32,
) -> Engine<FakeClock> {
    let clock = FakeClock::new(0.0);
    let context = DurableContext::open_with_writer(
        FsContextWriter,
        dir.join("context.json"),
        TaskId::new("t-1"),
        max_iterations,
        clock.now(),
    )
    .unwrap();
    Engine::new(
        TaskId::new("t-1"),
        context,
        dir.join("activity.ndjson"),
        worker,
        auditor,
        clock,
        EngineConfig {
            task: "What is the capital of Sweden?".into(),
            inactivity_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(10),
            prompt_config: prompts::PromptConfig::default(),
            keep_log: false,
        },
    )
    .unwrap()
}

#[tokio::test]
async fn happy_path_completes_and_records_worker_result() {
    let dir = tempdir().unwrap();
    let worker = Arc::new(FakeExecutor::new("worker"));
    worker.push_lines(vec![r#"{"status":"DONE","result":"Stockholm"}"#]);
    let auditor = Arc::new(FakeExecutor::new("auditor"));
    auditor.push_lines(vec![r#"{"verdict":"DONE","reason":"ok"}"#]);

    let mut engine = build_engine(dir.path(), worker, auditor, 3);
    let completed = engine.run().await.unwrap();

    assert!(completed);
    assert_eq!(engine.context().get_state(), TaskState::Completed);
    assert!(engine.context().task().worker_result.as_deref().unwrap().contains("Stockholm"));
    let states: Vec<_> = engine.context().task().history.iter().map(|h| h.state).collect();
    assert_eq!(
        states,
        vec![
            TaskState::WorkerExecuting,
            TaskState::AuditPending,
            TaskState::AuditorExecuting,
            TaskState::Completed,
        ]
    );
}

#[tokio::test]
async fn one_retry_then_done_increments_iteration_once() {
    let dir = tempdir().unwrap();
    let worker = Arc::new(FakeExecutor::new("worker"));
    worker.push_lines(vec![r#"{"status":"DONE","result":"a weak answer"}"#]);
    worker.push_lines(vec![r#"{"status":"DONE","result":"a much richer answer"}"#]);
    let auditor = Arc::new(FakeExecutor::new("auditor"));
    auditor.push_lines(vec![r#"{"verdict":"RETRY","reason":"no sources"}"#]);
    auditor.push_lines(vec![r#"{"verdict":"DONE","reason":"ok"}"#]);

    let mut engine = build_engine(dir.path(), worker, auditor, 3);
    let completed = engine.run().await.unwrap();

    assert!(completed);
    assert_eq!(engine.context().task().iteration_count, 1);
    assert!(engine
        .context()
        .task()
        .history
        .iter()
        .any(|h| h.state == TaskState::ReiterationPending));
}

#[tokio::test]
async fn max_iterations_exhausted_ends_failed() {
    let dir = tempdir().unwrap();
    let worker = Arc::new(FakeExecutor::new("worker"));
    for _ in 0..3 {
        worker.push_lines(vec![r#"{"status":"DONE","result":"attempt"}"#]);
    }
    let auditor = Arc::new(FakeExecutor::new("auditor"));
    for _ in 0..3 {
        auditor.push_lines(vec![r#"{"verdict":"RETRY","reason":"nope"}"#]);
    }

    let mut engine = build_engine(dir.path(), worker, auditor, 2);
    let completed = engine.run().await.unwrap();

    assert!(!completed);
    assert_eq!(engine.context().get_state(), TaskState::Failed);
    assert_eq!(
        engine.context().task().history.last().unwrap().reason.as_deref(),
        Some("max_iterations")
    );
}

#[tokio::test(start_paused = true)]
async fn worker_inactivity_recovers_to_success() {
    let dir = tempdir().unwrap();
    let worker = Arc::new(FakeExecutor::new("worker"));
    // a hung stream never yields a line, so the guard trips after
    // inactivity_timeout and the engine falls through to recovery.
    worker.push_hang();
    worker.set_recovery(oneshot_core::RecoveryResult {
        success: true,
        recovered_activity: vec![ActivityEvent::new(
            0.0,
            serde_json::json!({"status": "DONE", "result": "recovered artifact"}),
            Some("worker".into()),
        )],
        verdict: Some(ZombieVerdict::Success),
    });
    let auditor = Arc::new(FakeExecutor::new("auditor"));
    auditor.push_lines(vec![r#"{"verdict":"DONE","reason":"ok"}"#]);

    let clock = FakeClock::new(0.0);
    let context = DurableContext::open_with_writer(
        FsContextWriter,
        dir.path().join("context.json"),
        TaskId::new("t-1"),
        3,
        clock.now(),
    )
    .unwrap();
    let mut engine = Engine::new(
        TaskId::new("t-1"),
        context,
        dir.path().join("activity.ndjson"),
        worker,
        auditor,
        clock,
        EngineConfig {
            task: "task".into(),
            inactivity_timeout: Duration::from_millis(50),
            poll_interval: Duration::from_millis(10),
            prompt_config: prompts::PromptConfig::default(),
            keep_log: false,
        },
    )
    .unwrap();

    let completed = engine.run().await.unwrap();
    assert!(completed);
    let states: Vec<_> = engine.context().task().history.iter().map(|h| h.state).collect();
    assert!(states.contains(&TaskState::RecoveryPending));
}

#[tokio::test]
async fn rerunning_a_completed_context_is_a_no_op_success() {
    let dir = tempdir().unwrap();
    let worker = Arc::new(FakeExecutor::new("worker"));
    worker.push_lines(vec![r#"{"status":"DONE","result":"Stockholm"}"#]);
    let auditor = Arc::new(FakeExecutor::new("auditor"));
    auditor.push_lines(vec![r#"{"verdict":"DONE","reason":"ok"}"#]);
    let mut engine = build_engine(dir.path(), worker.clone(), auditor.clone(), 3);
    assert!(engine.run().await.unwrap());

    assert!(engine.run().await.unwrap());
    // no new executor invocations on the already-terminal re-run.
    assert_eq!(worker.calls().len(), 1);
}

#[tokio::test]
async fn auditor_prompt_carries_the_workers_context_window_across_the_save() {
    let dir = tempdir().unwrap();
    let worker = Arc::new(FakeExecutor::new("worker"));
    worker.push_lines(vec![
        "considering the options".to_string(),
        r#"{"status":"DONE","result":"Stockholm"}"#.to_string(),
        "wrapping up".to_string(),
    ]);
    let auditor = Arc::new(FakeExecutor::new("auditor"));
    auditor.push_lines(vec![r#"{"verdict":"DONE","reason":"ok"}"#]);

    let mut engine = build_engine(dir.path(), worker, auditor.clone(), 3);
    assert!(engine.run().await.unwrap());

    let sent = &auditor.calls()[0].prompt;
    assert!(
        sent.contains("considering the options") && sent.contains("wrapping up"),
        "auditor prompt must include the worker result's real context window, not an empty one: {sent}"
    );
}

#[tokio::test]
async fn interrupt_flag_set_before_run_ends_interrupted_immediately() {
    let dir = tempdir().unwrap();
    let worker = Arc::new(FakeExecutor::new("worker"));
    let auditor = Arc::new(FakeExecutor::new("auditor"));
    let mut engine = build_engine(dir.path(), worker, auditor, 3);
    engine.interrupt_handle().store(true, Ordering::Relaxed);

    let completed = engine.run().await.unwrap();
    assert!(!completed);
    assert_eq!(engine.context().get_state(), TaskState::Interrupted);
}
