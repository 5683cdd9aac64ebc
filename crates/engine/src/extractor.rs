// SPDX-License-Identifier: MIT
//! Result Extractor (C5, spec §4.5): scores every event in a Worker run's
//! activity log and selects the "best" one as the iteration's result.
//!
//! This is the first of the two near-duplicate extraction implementations
//! `original_source/` carries in the same module — the later definition
//! there shadows this one at runtime. Per spec §9's Open Questions, this
//! fuzzy-scored, context-capturing implementation is the one adopted as
//! authoritative.

use oneshot_core::{ActivityEvent, ResultSummary};

const CONTEXT_WINDOW: usize = 2;

/// Score one event's text against the additive heuristic (spec §4.5).
fn score_event(event: &ActivityEvent) -> i64 {
    let text = event.text();
    let upper = text.to_ascii_uppercase();
    let mut score: i64 = 0;

    if upper.contains("DONE") {
        score += 15;
    }
    if upper.contains("STATUS") {
        score += 10;
    }
    if upper.contains("SUCCESS") {
        score += 10;
    }

    let has_braces = text.contains('{') && text.contains('}');
    if has_braces {
        score += 5;
        if serde_json::from_str::<serde_json::Value>(&text).is_ok() {
            score += 5;
        }
    }

    if text.len() > 100 {
        score += 3;
    }
    if text.contains("\"status\"") {
        score += 8;
    }
    if text.contains("\"result\"") {
        score += 5;
    }

    if upper.contains("HUMAN") {
        score -= 10;
    }
    if upper.contains("INTERVENTION") {
        score -= 10;
    }

    score
}

/// Select the best-scoring event from a run's activity log. Ties prefer the
/// later event; if nothing scores above zero, falls back to the last event
/// in the log. `None` only when `events` is empty.
pub fn extract_result(events: &[ActivityEvent]) -> Option<ResultSummary> {
    if events.is_empty() {
        return None;
    }

    let mut best_idx = 0usize;
    let mut best_score = i64::MIN;
    for (i, event) in events.iter().enumerate() {
        let score = score_event(event);
        if score >= best_score {
            best_score = score;
            best_idx = i;
        }
    }

    let (idx, score) = if best_score > 0 {
        (best_idx, best_score)
    } else {
        let last = events.len() - 1;
        (last, score_event(&events[last]))
    };

    let leading_start = idx.saturating_sub(CONTEXT_WINDOW);
    let leading_context = events[leading_start..idx].iter().map(|e| e.text()).collect();
    let trailing_end = (idx + 1 + CONTEXT_WINDOW).min(events.len());
    let trailing_context = events[idx + 1..trailing_end].iter().map(|e| e.text()).collect();

    Some(ResultSummary {
        result: events[idx].text(),
        leading_context,
        trailing_context,
        score,
    })
}

#[cfg(test)]
#[path = "extractor_tests.rs"]
mod tests;
