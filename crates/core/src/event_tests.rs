// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn text_returns_string_payload_verbatim() {
    let event = ActivityEvent::new(1.0, serde_json::json!("hello"), None);
    assert_eq!(event.text(), "hello");
}

#[test]
fn text_renders_structured_payload_as_json() {
    let event = ActivityEvent::new(1.0, serde_json::json!({"status": "DONE"}), None);
    assert!(event.text().contains("\"status\":\"DONE\""));
}
