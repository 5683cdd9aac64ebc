// SPDX-License-Identifier: MIT

use super::*;
use crate::subprocess::{SubprocessExecutor, SubprocessExecutorConfig};
use std::time::Duration;

fn sample_metadata(name: &str) -> ExecutorMetadata {
    ExecutorMetadata {
        name: name.into(),
        captures_git: true,
        supports_model_selection: true,
    }
}

fn sample_config(name: &str) -> SubprocessExecutorConfig {
    SubprocessExecutorConfig {
        name: name.into(),
        command: "true".into(),
        args: Vec::new(),
        cwd: std::env::temp_dir(),
        env: Vec::new(),
        grace_period: Duration::from_secs(1),
        created_at: 0.0,
        session_history_path: None,
        captures_git: true,
    }
}

#[test]
fn register_then_create_returns_a_working_executor() {
    let registry = ExecutorRegistry::new();
    registry.register(sample_metadata("claude"), || {
        Arc::new(SubprocessExecutor::new(sample_config("claude")))
    });
    let executor = registry.create("claude").unwrap();
    assert_eq!(executor.metadata().name, "claude");
}

#[test]
fn unregister_removes_the_entry() {
    let registry = ExecutorRegistry::new();
    registry.register(sample_metadata("claude"), || {
        Arc::new(SubprocessExecutor::new(sample_config("claude")))
    });
    registry.unregister("claude");
    assert!(registry.create("claude").is_none());
}

#[test]
fn available_names_is_sorted() {
    let registry = ExecutorRegistry::new();
    registry.register(sample_metadata("zeta"), || {
        Arc::new(SubprocessExecutor::new(sample_config("zeta")))
    });
    registry.register(sample_metadata("alpha"), || {
        Arc::new(SubprocessExecutor::new(sample_config("alpha")))
    });
    assert_eq!(registry.available_names(), vec!["alpha", "zeta"]);
}
