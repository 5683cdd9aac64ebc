// SPDX-License-Identifier: MIT
//! The streaming pipeline (C2, spec §4.2): five composable stages —
//! ingest → timestamp → inactivity-guard → log → parse — each a lazy
//! transformer over a sequence of events.
//!
//! The inactivity guard's side monitor mirrors the structure of the
//! teacher's `watch_agent` poll loop (`oj-adapters/src/agent/watcher.rs`):
//! a `tokio::select!` over the next upstream item and an independent timer
//! tick, at a cadence within the spec's ≤500ms bound.

use crate::error::ExecuteError;
use crate::executor::ExecutionStream;
use futures::{Stream, StreamExt};
use oneshot_core::{ActivityEvent, Clock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default inactivity-monitor poll cadence (spec §4.2: "≤500ms").
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Stage 1: entry point. An `ExecutionStream` already is a
/// `Stream<Item = Result<String, ExecuteError>>`; this exists so the
/// pipeline reads as five named stages end to end, matching spec §4.2.
pub fn ingest(raw: ExecutionStream) -> impl Stream<Item = Result<String, ExecuteError>> {
    raw
}

/// Stage 2: wrap each raw line in `{timestamp, data, executor, is_heartbeat}`.
pub fn timestamp<C: Clock>(
    lines: impl Stream<Item = Result<String, ExecuteError>> + Send + 'static,
    clock: C,
    executor_name: Option<String>,
) -> impl Stream<Item = Result<ActivityEvent, ExecuteError>> {
    lines.map(move |item| {
        item.map(|line| {
            ActivityEvent::new(clock.now(), serde_json::Value::String(line), executor_name.clone())
        })
    })
}

/// Stage 3: fail the stream with `InactivityTimeout` if no item has passed
/// through for longer than `timeout`. Tracked via a single atomic word
/// (milliseconds since the guard's own start instant) so the monitor never
/// needs a lock on the hot path (spec §5).
pub fn inactivity_guard(
    events: impl Stream<Item = Result<ActivityEvent, ExecuteError>> + Send + 'static,
    timeout: Duration,
    poll_interval: Duration,
) -> impl Stream<Item = Result<ActivityEvent, ExecuteError>> {
    async_stream::stream! {
        tokio::pin!(events);
        let start = Instant::now();
        let last_activity_ms = Arc::new(AtomicU64::new(0));

        loop {
            tokio::select! {
                item = events.next() => {
                    match item {
                        Some(event) => {
                            last_activity_ms.store(start.elapsed().as_millis() as u64, Ordering::Relaxed);
                            yield event;
                        }
                        None => break,
                    }
                }
                _ = tokio::time::sleep(poll_interval) => {
                    let now_ms = start.elapsed().as_millis() as u64;
                    let idle_ms = now_ms.saturating_sub(last_activity_ms.load(Ordering::Relaxed));
                    let idle_secs = idle_ms as f64 / 1000.0;
                    if idle_secs > timeout.as_secs_f64() {
                        yield Err(ExecuteError::InactivityTimeout { elapsed_secs: idle_secs });
                        return;
                    }
                }
            }
        }
    }
}

/// Stage 4: append each event to the activity log via an injected sink,
/// then pass it through unchanged. The sink is owned by the caller (the
/// Engine wires it to `oneshot_storage::ActivityLogWriter::append`) so this
/// crate stays independent of the storage crate.
pub fn log<F>(
    events: impl Stream<Item = Result<ActivityEvent, ExecuteError>> + Send + 'static,
    mut sink: F,
) -> impl Stream<Item = Result<ActivityEvent, ExecuteError>>
where
    F: FnMut(&ActivityEvent) -> std::io::Result<()> + Send + 'static,
{
    events.map(move |item| match item {
        Ok(event) => match sink(&event) {
            Ok(()) => Ok(event),
            Err(e) => Err(ExecuteError::Io(e)),
        },
        Err(e) => Err(e),
    })
}

/// Stage 5: shape the event's payload into structured JSON when possible.
/// A line that doesn't parse as JSON stays a string — no line is ever
/// dropped (grounded on `original_source/src/oneshot/utils/json_parsing.py`'s
/// lenient-extraction behavior).
pub fn parse(
    events: impl Stream<Item = Result<ActivityEvent, ExecuteError>> + Send + 'static,
) -> impl Stream<Item = Result<ActivityEvent, ExecuteError>> {
    events.map(|item| {
        item.map(|mut event| {
            if let serde_json::Value::String(s) = &event.data {
                if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(s) {
                    event.data = parsed;
                }
            }
            event
        })
    })
}

/// Compose all five stages over one `ExecutionStream`.
pub fn build<C, F>(
    raw: ExecutionStream,
    clock: C,
    executor_name: Option<String>,
    inactivity_timeout: Duration,
    poll_interval: Duration,
    sink: F,
) -> impl Stream<Item = Result<ActivityEvent, ExecuteError>>
where
    C: Clock,
    F: FnMut(&ActivityEvent) -> std::io::Result<()> + Send + 'static,
{
    let staged = timestamp(ingest(raw), clock, executor_name);
    let guarded = inactivity_guard(staged, inactivity_timeout, poll_interval);
    let logged = log(guarded, sink);
    parse(logged)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
