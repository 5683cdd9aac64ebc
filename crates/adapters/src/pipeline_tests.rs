// SPDX-License-Identifier: MIT

use super::*;
use oneshot_core::FakeClock;

fn event_stream(
    items: Vec<Result<String, ExecuteError>>,
) -> impl Stream<Item = Result<String, ExecuteError>> {
    futures::stream::iter(items)
}

#[tokio::test]
async fn timestamp_stage_wraps_lines_with_clock_reading() {
    let clock = FakeClock::new(10.0);
    let lines = event_stream(vec![Ok("hello".into())]);
    let mut stamped = Box::pin(timestamp(lines, clock, Some("worker".into())));
    let event = stamped.next().await.unwrap().unwrap();
    assert_eq!(event.timestamp, 10.0);
    assert_eq!(event.executor.as_deref(), Some("worker"));
    assert!(!event.is_heartbeat);
}

#[tokio::test]
async fn parse_stage_upgrades_json_text_to_structured_data() {
    let clock = FakeClock::new(0.0);
    let lines = event_stream(vec![Ok("{\"status\":\"DONE\"}".into())]);
    let stamped = timestamp(lines, clock, None);
    let mut parsed = Box::pin(parse(stamped));
    let event = parsed.next().await.unwrap().unwrap();
    assert_eq!(event.data, serde_json::json!({"status": "DONE"}));
}

#[tokio::test]
async fn parse_stage_leaves_non_json_text_as_a_string() {
    let clock = FakeClock::new(0.0);
    let lines = event_stream(vec![Ok("plain text".into())]);
    let stamped = timestamp(lines, clock, None);
    let mut parsed = Box::pin(parse(stamped));
    let event = parsed.next().await.unwrap().unwrap();
    assert_eq!(event.data, serde_json::json!("plain text"));
}

#[tokio::test]
async fn log_stage_invokes_sink_for_every_event_then_passes_through() {
    let clock = FakeClock::new(0.0);
    let lines = event_stream(vec![Ok("a".into()), Ok("b".into())]);
    let stamped = timestamp(lines, clock, None);
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let logged = log(stamped, move |event| {
        seen_clone.lock().push(event.text());
        Ok(())
    });
    let collected: Vec<_> = Box::pin(logged).collect().await;
    assert_eq!(collected.len(), 2);
    assert_eq!(*seen.lock(), vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn inactivity_guard_trips_when_upstream_goes_silent() {
    let clock = FakeClock::new(0.0);
    let lines = futures::stream::once(async { Ok("only line".to_string()) }).chain(
        futures::stream::pending(),
    );
    let stamped = timestamp(lines, clock, None);
    let guarded = inactivity_guard(stamped, Duration::from_millis(50), Duration::from_millis(10));
    tokio::pin!(guarded);

    let first = guarded.next().await.unwrap();
    assert!(first.is_ok());

    tokio::time::advance(Duration::from_millis(200)).await;
    let second = guarded.next().await.unwrap();
    assert!(matches!(second, Err(ExecuteError::InactivityTimeout { .. })));
}

#[tokio::test]
async fn inactivity_guard_passes_through_a_stream_that_stays_active() {
    let clock = FakeClock::new(0.0);
    let lines = event_stream(vec![Ok("a".into()), Ok("b".into()), Ok("c".into())]);
    let stamped = timestamp(lines, clock, None);
    let guarded = inactivity_guard(stamped, Duration::from_secs(5), Duration::from_millis(10));
    let collected: Vec<_> = Box::pin(guarded).collect().await;
    assert_eq!(collected.len(), 3);
    assert!(collected.iter().all(|r| r.is_ok()));
}
