// SPDX-License-Identifier: MIT

//! Persistence tests for the file-backed call-budget tracker.

use enduro_tracker::services::{CallLog, QuotaLimits, QuotaTracker};
use tempfile::TempDir;

fn tracker(dir: &TempDir, limits: QuotaLimits) -> QuotaTracker {
    QuotaTracker::new(dir.path().join("strava_api_calls.json"), limits)
}

fn tight_limits(short_max: usize) -> QuotaLimits {
    QuotaLimits {
        short_window: 900,
        short_max,
        day_window: 86_400,
        day_max: 999,
        short_margin: 2,
        day_margin: 10,
    }
}

#[test]
fn test_missing_file_reads_as_empty_log() {
    let dir = TempDir::new().unwrap();
    let tracker = tracker(&dir, QuotaLimits::default());
    let log = tracker.load().unwrap();
    assert_eq!(log, CallLog::default());
}

#[test]
fn test_call_log_round_trips_through_file() {
    let dir = TempDir::new().unwrap();
    let tracker = tracker(&dir, QuotaLimits::default());
    let log = CallLog {
        times: vec![100, 200, 300],
        last_index: 1,
    };
    tracker.save(&log).unwrap();
    assert_eq!(tracker.load().unwrap(), log);
}

#[test]
fn test_acquire_appends_and_persists_on_grant() {
    let dir = TempDir::new().unwrap();
    let tracker = tracker(&dir, QuotaLimits::default());

    let wait = tracker.acquire(1000).unwrap();
    assert_eq!(wait, 0);

    // The accepted call is visible to a fresh tracker on the same file.
    let reopened = QuotaTracker::new(
        dir.path().join("strava_api_calls.json"),
        QuotaLimits::default(),
    );
    assert_eq!(reopened.load().unwrap().times, vec![1000]);
}

#[test]
fn test_rejected_acquire_persists_without_appending() {
    let dir = TempDir::new().unwrap();
    let tracker = tracker(&dir, tight_limits(2));
    assert_eq!(tracker.acquire(100).unwrap(), 0);
    assert_eq!(tracker.acquire(200).unwrap(), 0);

    let wait = tracker.acquire(250).unwrap();
    assert_eq!(wait, (900 - (250 - 100) + 2) as u64);
    // No third timestamp was logged for the rejected attempt.
    assert_eq!(tracker.load().unwrap().times, vec![100, 200]);
}

#[test]
fn test_hand_edited_cursor_past_log_end_is_tolerated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strava_api_calls.json");
    std::fs::write(&path, r#"{"times":[100,200],"last_index":100}"#).unwrap();

    let tracker = QuotaTracker::new(&path, tight_limits(99));
    // The out-of-range cursor is clamped, not indexed.
    assert_eq!(tracker.acquire(250).unwrap(), 0);

    let log = tracker.load().unwrap();
    assert_eq!(log.times, vec![100, 200, 250]);
    assert!(log.last_index < log.times.len());
}

#[test]
fn test_slot_frees_after_window_passes() {
    let dir = TempDir::new().unwrap();
    let tracker = tracker(&dir, tight_limits(2));
    assert_eq!(tracker.acquire(100).unwrap(), 0);
    assert_eq!(tracker.acquire(200).unwrap(), 0);
    assert!(tracker.acquire(250).unwrap() > 0);

    // Once the first call ages out of the short window a slot opens up.
    assert_eq!(tracker.acquire(1001).unwrap(), 0);
    assert_eq!(tracker.load().unwrap().times, vec![100, 200, 1001]);
}
