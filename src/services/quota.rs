// SPDX-License-Identifier: MIT

//! Persistent API call-budget tracking.
//!
//! Strava limits applications with two sliding windows: 100 requests per 15
//! minutes and 1,000 per day. We track one timestamp per accepted call in a
//! JSON document that survives process restarts, and stay one call under
//! each published limit.
//!
//! The window arithmetic lives in [`reserve_slot`], a pure function over the
//! log, so it can be tested without touching the filesystem or the clock.
//! [`QuotaTracker`] wraps it with load/save at the edges.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Ordered timestamps of past accepted calls, plus a cursor marking the
/// oldest entry still inside the short window.
///
/// Invariant: `times` is non-decreasing and `last_index` never points past
/// the first timestamp still within the short window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallLog {
    pub times: Vec<i64>,
    pub last_index: usize,
}

/// Quota windows and per-window call budgets.
#[derive(Debug, Clone)]
pub struct QuotaLimits {
    /// Short window length in seconds.
    pub short_window: i64,
    /// Max calls inside the short window.
    pub short_max: usize,
    /// Daily window length in seconds.
    pub day_window: i64,
    /// Max calls inside the daily window.
    pub day_max: usize,
    /// Extra seconds added to a short-window wait.
    pub short_margin: i64,
    /// Extra seconds added to a daily-window wait.
    pub day_margin: i64,
}

impl Default for QuotaLimits {
    fn default() -> Self {
        // One under Strava's published 100/15min and 1000/day limits.
        Self {
            short_window: 900,
            short_max: 99,
            day_window: 86_400,
            day_max: 999,
            short_margin: 2,
            day_margin: 10,
        }
    }
}

/// Try to reserve a call slot at `now`.
///
/// Returns 0 if the call may proceed, in which case `now` has been appended
/// to the log. Otherwise returns the number of seconds to wait before
/// retrying, and the log is left without a new entry (trimming aside).
pub fn reserve_slot(log: &mut CallLog, now: i64, limits: &QuotaLimits) -> u64 {
    // Evict entries that have aged out of the daily window.
    let cut = log
        .times
        .iter()
        .take_while(|&&t| now - t > limits.day_window)
        .count();
    log.times.drain(..cut);
    log.last_index = log.last_index.saturating_sub(cut);
    // A hand-edited or truncated log can carry a cursor past the end of
    // `times`; clamp it rather than index out of bounds below.
    log.last_index = log.last_index.min(log.times.len().saturating_sub(1));

    // Over the daily budget: wait until the oldest entry ages out.
    if log.times.len() > limits.day_max {
        let wait = limits.day_window - (now - log.times[0]) + limits.day_margin;
        return wait.max(0) as u64;
    }

    // Advance the cursor to the first entry still inside the short window.
    while log.last_index + 1 < log.times.len()
        && now - log.times[log.last_index] > limits.short_window
    {
        log.last_index += 1;
    }

    // Over the short budget: wait until the entry at the cursor ages out.
    if log.times.len() - log.last_index >= limits.short_max {
        let wait = limits.short_window - (now - log.times[log.last_index]) + limits.short_margin;
        return wait.max(0) as u64;
    }

    // Slot granted; the call is about to be made, so log it now.
    log.times.push(now);
    0
}

/// File-backed quota tracker.
///
/// The read-check-append-write sequence runs under a mutex so concurrent
/// in-process callers cannot log a timestamp without a permitted call.
pub struct QuotaTracker {
    path: PathBuf,
    limits: QuotaLimits,
    lock: Mutex<()>,
}

impl QuotaTracker {
    pub fn new<P: AsRef<Path>>(path: P, limits: QuotaLimits) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            limits,
            lock: Mutex::new(()),
        }
    }

    pub fn limits(&self) -> &QuotaLimits {
        &self.limits
    }

    /// Read the persisted log. A missing file yields an empty log.
    pub fn load(&self) -> Result<CallLog> {
        match fs::read_to_string(&self.path) {
            Ok(data) => serde_json::from_str(&data)
                .map_err(|e| AppError::Storage(format!("Corrupt call log: {}", e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CallLog::default()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read call log {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Persist the log as a single JSON document.
    pub fn save(&self, log: &CallLog) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("Failed to create {:?}: {}", parent, e)))?;
        }
        let data = serde_json::to_string(log)
            .map_err(|e| AppError::Storage(format!("Failed to encode call log: {}", e)))?;
        fs::write(&self.path, data).map_err(|e| {
            AppError::Storage(format!(
                "Failed to write call log {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Load, reserve a slot at `now`, and persist the updated log.
    ///
    /// Returns the seconds to wait (0 when the call may proceed).
    pub fn acquire(&self, now: i64) -> Result<u64> {
        let _guard = self.lock.lock().map_err(|_| {
            AppError::Storage("Call log lock poisoned by a panicked caller".to_string())
        })?;
        let mut log = self.load()?;
        let wait = reserve_slot(&mut log, now, &self.limits);
        self.save(&log)?;
        Ok(wait)
    }

    /// `acquire` at the current wall-clock second.
    pub fn acquire_now(&self) -> Result<u64> {
        self.acquire(chrono::Utc::now().timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(short_window: i64, short_max: usize, day_window: i64, day_max: usize) -> QuotaLimits {
        QuotaLimits {
            short_window,
            short_max,
            day_window,
            day_max,
            short_margin: 2,
            day_margin: 10,
        }
    }

    #[test]
    fn test_accepted_call_appends_exactly_one_timestamp() {
        let mut log = CallLog::default();
        let wait = reserve_slot(&mut log, 1000, &QuotaLimits::default());
        assert_eq!(wait, 0);
        assert_eq!(log.times, vec![1000]);
        assert_eq!(log.last_index, 0);
    }

    #[test]
    fn test_short_window_rejection_matches_reference_example() {
        // W_short=900, Q_short=2, times=[100,200], last_index=0, now=250.
        let limits = limits(900, 2, 86_400, 999);
        let mut log = CallLog {
            times: vec![100, 200],
            last_index: 0,
        };
        let wait = reserve_slot(&mut log, 250, &limits);
        assert_eq!(wait, (900 - (250 - 100) + 2) as u64);
        // Rejected attempt must not grow the log.
        assert_eq!(log.times, vec![100, 200]);
    }

    #[test]
    fn test_short_window_rejection_does_not_append() {
        let limits = limits(900, 3, 86_400, 999);
        let mut log = CallLog {
            times: vec![10, 20, 30],
            last_index: 0,
        };
        let before = log.times.len();
        let wait = reserve_slot(&mut log, 40, &limits);
        assert!(wait > 0);
        assert_eq!(log.times.len(), before);
    }

    #[test]
    fn test_cursor_advances_past_aged_entries() {
        let limits = limits(900, 2, 86_400, 999);
        // First entry aged out of the short window, so only one call counts.
        let mut log = CallLog {
            times: vec![100, 1500],
            last_index: 0,
        };
        let wait = reserve_slot(&mut log, 1600, &limits);
        assert_eq!(wait, 0);
        assert_eq!(log.last_index, 1);
        assert_eq!(log.times, vec![100, 1500, 1600]);
    }

    #[test]
    fn test_day_window_eviction_bounds_count() {
        let limits = limits(900, 99, 1000, 2);
        let mut log = CallLog {
            times: vec![1, 2, 3, 500, 600],
            last_index: 3,
        };
        // now=1300: entries 1,2,3 are older than the 1000s day window.
        let wait = reserve_slot(&mut log, 1300, &limits);
        assert_eq!(wait, 0);
        // Evicted three, cursor shifted left by three (clamped at 0).
        assert_eq!(log.times, vec![500, 600, 1300]);
        assert_eq!(log.last_index, 0);
    }

    #[test]
    fn test_day_quota_wait_ages_out_oldest_entry() {
        let limits = limits(900, 99, 1000, 2);
        let mut log = CallLog {
            times: vec![100, 200, 300],
            last_index: 0,
        };
        let now = 400;
        let wait = reserve_slot(&mut log, now, &limits);
        assert!(wait > 0);
        assert_eq!(log.times.len(), 3);
        // After waiting, the oldest entry has aged out of the daily window.
        let later = now + wait as i64;
        assert!(later - log.times[0] > limits.day_window);
    }

    #[test]
    fn test_cursor_clamps_to_zero_on_heavy_eviction() {
        let limits = limits(900, 99, 1000, 999);
        let mut log = CallLog {
            times: vec![1, 2],
            last_index: 1,
        };
        // Everything evicts; cursor must not underflow.
        let wait = reserve_slot(&mut log, 5000, &limits);
        assert_eq!(wait, 0);
        assert_eq!(log.times, vec![5000]);
        assert_eq!(log.last_index, 0);
    }

    #[test]
    fn test_out_of_range_cursor_is_clamped() {
        // Invariant violation from outside: cursor way past the log end.
        let mut log = CallLog {
            times: vec![100, 200],
            last_index: 100,
        };
        let wait = reserve_slot(&mut log, 250, &QuotaLimits::default());
        assert_eq!(wait, 0);
        assert_eq!(log.times, vec![100, 200, 250]);
        assert!(log.last_index < log.times.len());
    }

    #[test]
    fn test_call_log_round_trips_through_json() {
        let log = CallLog {
            times: vec![100, 200, 300],
            last_index: 1,
        };
        let encoded = serde_json::to_string(&log).unwrap();
        let decoded: CallLog = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, log);
    }
}
