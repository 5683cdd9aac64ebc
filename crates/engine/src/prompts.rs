// SPDX-License-Identifier: MIT
//! Prompt Generator (C6, spec §4.5): assembles the Worker and Auditor
//! prompts for one iteration.

use oneshot_core::ResultSummary;

const TRUNCATION_MARKER: &str = "\n...[truncated]";

const WORKER_SYSTEM_PREAMBLE: &str =
    "You are the Worker. Produce an answer or code change that satisfies the task below.";

const REWORKER_PREAMBLE: &str =
    "You are the Worker, revising prior work. Address the Auditor's feedback below, then the task.";

const AUDITOR_SYSTEM_PREAMBLE: &str = "You are the Auditor. Judge whether the Worker's result \
satisfies the task. Respond with a verdict of DONE, RETRY, or IMPOSSIBLE, plus a brief reason.";

#[derive(Debug, Clone, Copy)]
pub struct PromptConfig {
    pub max_chars: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self { max_chars: 16_000 }
    }
}

fn truncate(prompt: String, max_chars: usize) -> String {
    if prompt.chars().count() <= max_chars {
        return prompt;
    }
    let budget = max_chars.saturating_sub(TRUNCATION_MARKER.len());
    let mut truncated: String = prompt.chars().take(budget).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// First iteration: a system-instruction preamble followed by the verbatim task.
pub fn worker_first_iteration(task: &str, config: PromptConfig) -> String {
    truncate(format!("{WORKER_SYSTEM_PREAMBLE}\n\n{task}"), config.max_chars)
}

/// Reiteration: the preceding Auditor's feedback, the task, and a reworker preamble.
pub fn worker_reiteration(task: &str, auditor_feedback: &str, config: PromptConfig) -> String {
    truncate(
        format!("{REWORKER_PREAMBLE}\n\nAuditor feedback:\n{auditor_feedback}\n\nTask:\n{task}"),
        config.max_chars,
    )
}

/// Auditor: the task, the extracted Worker result with context, then the
/// Auditor system instructions.
pub fn auditor(task: &str, result: &ResultSummary, config: PromptConfig) -> String {
    let mut body = String::new();
    body.push_str("Task (what was requested):\n");
    body.push_str(task);
    body.push_str("\n\nWorker result:\n");
    if !result.leading_context.is_empty() {
        body.push_str("...\n");
        for line in &result.leading_context {
            body.push_str(line);
            body.push('\n');
        }
    }
    body.push_str(&result.result);
    body.push('\n');
    for line in &result.trailing_context {
        body.push_str(line);
        body.push('\n');
    }
    body.push_str("\n\n");
    body.push_str(AUDITOR_SYSTEM_PREAMBLE);
    truncate(body, config.max_chars)
}

#[cfg(test)]
#[path = "prompts_tests.rs"]
mod tests;
