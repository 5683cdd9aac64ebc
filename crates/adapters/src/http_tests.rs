// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn metadata_reports_no_git_capture_or_model_selection() {
    let executor = DirectHttpExecutor::new(DirectHttpExecutorConfig {
        name: "http-agent".into(),
        endpoint: "http://127.0.0.1:0/run".into(),
        bearer_token: None,
        request_timeout: Duration::from_secs(30),
    });
    let meta = executor.metadata();
    assert!(!meta.captures_git);
    assert!(!meta.supports_model_selection);
}

#[tokio::test]
async fn recover_always_reports_dead() {
    let executor = DirectHttpExecutor::new(DirectHttpExecutorConfig {
        name: "http-agent".into(),
        endpoint: "http://127.0.0.1:0/run".into(),
        bearer_token: None,
        request_timeout: Duration::from_secs(30),
    });
    let result = executor.recover(&TaskId::new("t-1")).await;
    assert!(!result.success);
    assert_eq!(result.verdict, Some(ZombieVerdict::Dead));
}
