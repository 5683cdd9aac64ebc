// SPDX-License-Identifier: MIT

use super::*;

fn cli(args: &[&str]) -> Cli {
    let mut full = vec!["oneshot"];
    full.extend_from_slice(args);
    Cli::parse_from(full)
}

#[test]
fn cli_flag_overrides_file_config() {
    let file = FileConfig {
        max_iterations: Some(2),
        ..Default::default()
    };
    let resolved = resolve(cli(&["do the thing", "--max-iterations", "9"]), file).unwrap();
    assert_eq!(resolved.max_iterations, 9);
}

#[test]
fn file_config_supplies_default_when_cli_is_silent() {
    let file = FileConfig {
        max_iterations: Some(2),
        executor: Some("direct-http".to_string()),
        ..Default::default()
    };
    let resolved = resolve(cli(&["do the thing"]), file).unwrap();
    assert_eq!(resolved.max_iterations, 2);
    assert_eq!(resolved.executor, "direct-http");
}

#[test]
fn missing_prompt_is_rejected() {
    let result = resolve(cli(&[]), FileConfig::default());
    assert!(result.is_err());
}

#[test]
fn defaults_apply_when_nothing_is_configured() {
    let resolved = resolve(cli(&["task text"]), FileConfig::default()).unwrap();
    assert_eq!(resolved.max_iterations, DEFAULT_MAX_ITERATIONS);
    assert_eq!(resolved.executor, "subprocess");
    assert!(!resolved.resume);
    assert_eq!(resolved.max_concurrent, DEFAULT_MAX_CONCURRENT);
    assert_eq!(resolved.idle_threshold, DEFAULT_IDLE_THRESHOLD);
}

#[test]
fn max_concurrent_and_idle_threshold_flags_override_file_and_defaults() {
    let file = FileConfig {
        max_concurrent: Some(2),
        idle_threshold: Some(30.0),
        ..Default::default()
    };
    let resolved = resolve(
        cli(&["task text", "--max-concurrent", "8", "--idle-threshold", "90"]),
        file,
    )
    .unwrap();
    assert_eq!(resolved.max_concurrent, 8);
    assert_eq!(resolved.idle_threshold, 90.0);
}

#[test]
fn passing_session_implies_resume() {
    let resolved = resolve(
        cli(&["task text", "--session", "/tmp/whatever.json"]),
        FileConfig::default(),
    )
    .unwrap();
    assert!(resolved.resume);
}
