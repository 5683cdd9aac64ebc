// SPDX-License-Identifier: MIT

use super::*;

#[yare::parameterized(
    json_verdict = { vec![r#"{"verdict":"retry","reason":"no sources"}"#.to_string()], AuditorVerdict::Retry },
    verdict_field_pattern = { vec![r#"noise "verdict": "IMPOSSIBLE" trailing"#.to_string()], AuditorVerdict::Impossible },
    status_field_pattern = { vec![r#"{"status": "done"}"#.to_string()], AuditorVerdict::Done },
    plain_words_complete = { vec!["looks complete to me".to_string()], AuditorVerdict::Done },
    plain_words_retry = { vec!["this is incomplete, please retry".to_string()], AuditorVerdict::Retry },
    plain_words_impossible = { vec!["cannot be done".to_string()], AuditorVerdict::Impossible },
)]
fn extraction_order(lines: Vec<String>, expected: AuditorVerdict) {
    let (verdict, unparseable) = extract_verdict(&lines);
    assert_eq!(verdict, expected);
    assert!(!unparseable);
}

#[test]
fn json_verdict_field_takes_priority_over_status_field() {
    let lines = vec![r#"{"verdict":"done","status":"retry"}"#.to_string()];
    let (verdict, _) = extract_verdict(&lines);
    assert_eq!(verdict, AuditorVerdict::Done);
}

#[test]
fn lowercase_verdict_value_still_matches_uppercase_words() {
    let lines = vec![r#"{"verdict":"retry"}"#.to_string()];
    let (verdict, _) = extract_verdict(&lines);
    assert_eq!(verdict, AuditorVerdict::Retry);
}

#[test]
fn unrecognized_tail_defaults_to_done_and_flags_unparseable() {
    let lines = vec!["gibberish with no signal whatsoever".to_string()];
    let (verdict, unparseable) = extract_verdict(&lines);
    assert_eq!(verdict, AuditorVerdict::Done);
    assert!(unparseable);
}

#[test]
fn only_scans_the_last_n_lines_of_a_longer_log() {
    let mut lines: Vec<String> = (0..20).map(|i| format!("noise {i}")).collect();
    lines[5] = r#"{"verdict":"impossible"}"#.to_string();
    let (verdict, unparseable) = extract_verdict(&lines);
    // line 5 falls outside the last VERDICT_TAIL_LINES window.
    assert_eq!(verdict, AuditorVerdict::Done);
    assert!(unparseable);
}
