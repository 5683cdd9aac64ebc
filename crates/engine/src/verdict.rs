// SPDX-License-Identifier: MIT
//! Auditor verdict extraction (spec §4.5), grounded on
//! `original_source/src/oneshot/utils/verdict_parsing.py`'s
//! `parse_json_verdict`/`parse_lenient_verdict` fallback chain, kept in the
//! same four-step order and with the same uppercase-before-match behavior.

use oneshot_core::AuditorVerdict;
use regex::Regex;
use std::sync::LazyLock;

/// Window size for the "tail of the log" scan (spec §9 Open Questions:
/// "a heuristic, not a spec-required number... must document the window").
pub const VERDICT_TAIL_LINES: usize = 10;

static VERDICT_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""verdict"\s*:\s*"([^"]+)""#).unwrap());
static STATUS_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""status"\s*:\s*"([^"]+)""#).unwrap());

/// Extract a verdict from the last `VERDICT_TAIL_LINES` texts of the
/// Auditor's activity log, in order: (a) parse JSON with a `verdict`
/// field, (b) match a `"verdict": "..."` pattern, (c) match a
/// `"status": "..."` pattern, (d) match plain completion words. An
/// unrecognized tail is treated as `DONE` to avoid an infinite retry loop,
/// but the caller is expected to log that fallback.
pub fn extract_verdict(lines: &[String]) -> (AuditorVerdict, bool) {
    let tail_start = lines.len().saturating_sub(VERDICT_TAIL_LINES);
    let tail = &lines[tail_start..];

    for line in tail.iter().rev() {
        if let Some(verdict) = parse_json_verdict(line) {
            return (verdict, false);
        }
    }
    for line in tail.iter().rev() {
        if let Some(m) = VERDICT_FIELD.captures(line) {
            if let Some(v) = word_to_verdict(&m[1]) {
                return (v, false);
            }
        }
    }
    for line in tail.iter().rev() {
        if let Some(m) = STATUS_FIELD.captures(line) {
            if let Some(v) = word_to_verdict(&m[1]) {
                return (v, false);
            }
        }
    }
    for line in tail.iter().rev() {
        if let Some(v) = plain_words_to_verdict(line) {
            return (v, false);
        }
    }

    // VerdictUnparseable: default to DONE, but flag it for the caller to log.
    (AuditorVerdict::Done, true)
}

fn parse_json_verdict(line: &str) -> Option<AuditorVerdict> {
    let value: serde_json::Value = serde_json::from_str(line).ok()?;
    let verdict = value.get("verdict")?.as_str()?;
    word_to_verdict(verdict)
}

fn word_to_verdict(raw: &str) -> Option<AuditorVerdict> {
    match raw.to_ascii_uppercase().as_str() {
        "DONE" => Some(AuditorVerdict::Done),
        "RETRY" => Some(AuditorVerdict::Retry),
        "IMPOSSIBLE" => Some(AuditorVerdict::Impossible),
        _ => None,
    }
}

fn plain_words_to_verdict(line: &str) -> Option<AuditorVerdict> {
    let lower = line.to_ascii_lowercase();
    if lower.contains("done") || lower.contains("complete") || lower.contains("success") {
        Some(AuditorVerdict::Done)
    } else if lower.contains("retry") || lower.contains("incomplete") {
        Some(AuditorVerdict::Retry)
    } else if lower.contains("impossible") || lower.contains("cannot") {
        Some(AuditorVerdict::Impossible)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "verdict_tests.rs"]
mod tests;
