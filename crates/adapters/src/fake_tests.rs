// SPDX-License-Identifier: MIT

use super::*;
use futures::StreamExt;

#[tokio::test]
async fn execute_yields_scripted_lines_in_order() {
    let fake = FakeExecutor::new("fake");
    fake.push_lines(vec!["one", "two"]);
    let mut stream = fake.execute("do the thing").await.unwrap();
    let mut lines = Vec::new();
    while let Some(item) = stream.next().await {
        lines.push(item.unwrap());
    }
    assert_eq!(lines, vec!["one", "two"]);
    assert_eq!(fake.calls(), vec![ExecuteCall { prompt: "do the thing".into() }]);
}

#[tokio::test]
async fn execute_with_no_script_left_yields_an_empty_stream() {
    let fake = FakeExecutor::new("fake");
    let mut stream = fake.execute("prompt").await.unwrap();
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn push_launch_error_is_returned_from_execute() {
    let fake = FakeExecutor::new("fake");
    fake.push_launch_error("boom");
    let err = fake.execute("prompt").await.unwrap_err();
    assert!(matches!(err, ExecuteError::LaunchError(_)));
}

#[tokio::test]
async fn recover_returns_the_scripted_result() {
    let fake = FakeExecutor::new("fake");
    fake.set_recovery(RecoveryResult {
        success: true,
        recovered_activity: Vec::new(),
        verdict: Some(oneshot_core::ZombieVerdict::Success),
    });
    let result = fake.recover(&TaskId::new("t-1")).await;
    assert!(result.success);
}
