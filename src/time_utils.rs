// SPDX-License-Identifier: MIT

//! Shared helpers for time and unit formatting.

const METERS_PER_MILE: f64 = 1609.344;
const FEET_PER_METER: f64 = 3.28084;

/// Format an elapsed-seconds value as `m:ss`.
pub fn to_min_sec(secs: i64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Meters to miles, rounded to two decimal places.
pub fn meters_to_miles(meters: f64) -> f64 {
    (meters / METERS_PER_MILE * 100.0).round() / 100.0
}

/// Meters to whole feet.
pub fn meters_to_feet(meters: f64) -> i64 {
    (meters * FEET_PER_METER) as i64
}
