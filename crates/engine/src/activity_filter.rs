// SPDX-License-Identifier: MIT
//! Activity filter: strips token-count/cost/usage-metric noise from Worker
//! activity before it reaches the result extractor or a prompt (spec §4.6
//! supplement), grounded on
//! `original_source/src/oneshot/providers/activity_interpreter.py`'s
//! `SENSITIVE_PATTERNS` list.

use oneshot_core::ActivityEvent;
use regex::Regex;
use std::sync::LazyLock;

static SENSITIVE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)"?input_tokens"?\s*[:=]\s*\d+"#,
        r#"(?i)"?output_tokens"?\s*[:=]\s*\d+"#,
        r#"(?i)"?total_tokens"?\s*[:=]\s*\d+"#,
        r#"(?i)"?cost_usd"?\s*[:=]\s*[\d.]+"#,
        r#"(?i)"?usage"?\s*[:=]\s*\{[^}]*\}"#,
        r#"(?i)"?billing[a-z_]*"?\s*[:=]\s*\S+"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern is valid"))
    .collect()
});

/// Redact any sensitive-metric substrings from one event's text, returning
/// a copy with the match replaced by `[redacted]`. Events whose text
/// contains no sensitive pattern are returned unchanged.
pub fn filter_event(event: &ActivityEvent) -> ActivityEvent {
    let text = event.text();
    let mut filtered = text.clone();
    for pattern in SENSITIVE_PATTERNS.iter() {
        filtered = pattern.replace_all(&filtered, "[redacted]").into_owned();
    }
    if filtered == text {
        return event.clone();
    }
    ActivityEvent {
        data: serde_json::Value::String(filtered),
        ..event.clone()
    }
}

/// Apply [`filter_event`] to a whole run's activity log, as done before
/// building the Auditor prompt.
pub fn filter_events(events: &[ActivityEvent]) -> Vec<ActivityEvent> {
    events.iter().map(filter_event).collect()
}

#[cfg(test)]
#[path = "activity_filter_tests.rs"]
mod tests;
