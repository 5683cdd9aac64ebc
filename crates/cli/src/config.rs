// SPDX-License-Identifier: MIT
//! Configuration file loading (spec §6): a JSON file at `$HOME/.oneshot.json`,
//! a YAML sibling, or an INI-style `.oneshotrc`, any of which may supply
//! defaults that the CLI's own flags override.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },

    #[error("failed to parse {path} as JSON: {source}")]
    Json { path: String, source: serde_json::Error },

    #[error("failed to parse {path} as YAML: {source}")]
    Yaml { path: String, source: serde_yaml::Error },

    #[error("{path}:{line}: unrecognized key {key:?}")]
    UnknownKey { path: String, line: usize, key: String },

    #[error("{path}:{line}: malformed line (expected `key = value`): {text:?}")]
    Malformed { path: String, line: usize, text: String },
}

/// Recognized keys, one-for-one with CLI options (spec §6). Any key outside
/// this set is a loud rejection rather than a silently ignored typo.
const RECOGNIZED_KEYS: &[&str] = &[
    "max_iterations",
    "executor",
    "worker_model",
    "auditor_model",
    "initial_timeout",
    "max_timeout",
    "activity_interval",
    "session",
    "session_log",
    "keep_log",
    "max_concurrent",
    "idle_threshold",
];

/// File-sourced defaults. Every field is optional: a config file may supply
/// any subset of keys, and the CLI's own flags always take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub max_iterations: Option<u32>,
    pub executor: Option<String>,
    pub worker_model: Option<String>,
    pub auditor_model: Option<String>,
    pub initial_timeout: Option<f64>,
    pub max_timeout: Option<f64>,
    pub activity_interval: Option<f64>,
    pub session: Option<PathBuf>,
    pub session_log: Option<PathBuf>,
    pub keep_log: Option<bool>,
    pub max_concurrent: Option<usize>,
    pub idle_threshold: Option<f64>,
}

impl FileConfig {
    /// Load from the first of `$HOME/.oneshot.json`, `$HOME/.oneshot.yaml`,
    /// `$HOME/.oneshot.yml`, `$HOME/.oneshotrc` that exists. Returns the
    /// default (empty) config if none do.
    pub fn load_default() -> Result<Self, ConfigError> {
        let Some(home) = dirs_home() else {
            return Ok(Self::default());
        };
        for candidate in [
            home.join(".oneshot.json"),
            home.join(".oneshot.yaml"),
            home.join(".oneshot.yml"),
            home.join(".oneshotrc"),
        ] {
            if candidate.exists() {
                return Self::load_from(&candidate);
            }
        }
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&text).map_err(|source| ConfigError::Json {
                path: path.display().to_string(),
                source,
            }),
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
                    path: path.display().to_string(),
                    source,
                })
            }
            _ => parse_ini(path, &text),
        }
    }
}

/// Hand-rolled `.oneshotrc` parser: one `key = value` pair per line, `#` and
/// blank lines ignored. No sections, no quoting — a strict subset deliberately
/// simpler than a general INI grammar.
fn parse_ini(path: &Path, text: &str) -> Result<FileConfig, ConfigError> {
    let path_str = path.display().to_string();
    let recognized: HashSet<&str> = RECOGNIZED_KEYS.iter().copied().collect();
    let mut values = serde_json::Map::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(ConfigError::Malformed {
                path: path_str,
                line: line_no,
                text: raw_line.to_string(),
            });
        };
        let key = key.trim();
        let value = value.trim();
        if !recognized.contains(key) {
            return Err(ConfigError::UnknownKey {
                path: path_str,
                line: line_no,
                key: key.to_string(),
            });
        }
        values.insert(key.to_string(), ini_scalar(value));
    }

    serde_json::from_value(serde_json::Value::Object(values)).map_err(|source| ConfigError::Json {
        path: path_str,
        source,
    })
}

/// Coerce an `.oneshotrc` scalar into the JSON type its field expects:
/// `true`/`false` become booleans, anything that parses as a number becomes
/// one, everything else is a string.
fn ini_scalar(value: &str) -> serde_json::Value {
    match value {
        "true" => serde_json::Value::Bool(true),
        "false" => serde_json::Value::Bool(false),
        _ => {
            if let Ok(n) = value.parse::<f64>() {
                serde_json::json!(n)
            } else {
                serde_json::Value::String(value.to_string())
            }
        }
    }
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
