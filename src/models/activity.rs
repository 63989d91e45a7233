// SPDX-License-Identifier: MIT

//! Strava activity and segment-effort models.
//!
//! Field coverage follows what the aggregation pipeline consumes; anything
//! the API omits deserializes to 0 / empty rather than failing.

use serde::{Deserialize, Serialize};

/// Detailed activity record as fetched and cached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub device_name: Option<String>,
    /// Sport type string ("Ride", "Run", ...)
    #[serde(rename = "type", default)]
    pub activity_type: String,
    /// Distance in meters
    #[serde(default)]
    pub distance: f64,
    /// Elapsed time in seconds
    #[serde(default)]
    pub elapsed_time: i64,
    /// Total elevation gain in meters
    #[serde(default)]
    pub total_elevation_gain: f64,
    #[serde(default)]
    pub kudos_count: i64,
    #[serde(default)]
    pub max_speed: f64,
    #[serde(default)]
    pub calories: f64,
    /// Upload ID, used to order stored activities (newest first)
    #[serde(default)]
    pub upload_id: i64,
    #[serde(default)]
    pub trainer: bool,
    #[serde(default)]
    pub manual: bool,
    #[serde(default)]
    pub commute: bool,
    #[serde(default)]
    pub segment_efforts: Vec<SegmentEffort>,
}

impl Activity {
    /// An outdoor, GPS-recorded ride. Commutes still count.
    pub fn is_mtb_ride(&self) -> bool {
        self.activity_type == "Ride" && !self.trainer && !self.manual
    }
}

/// One timed traversal of a segment within an activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentEffort {
    #[serde(default)]
    pub id: u64,
    /// Elapsed time in seconds
    #[serde(default)]
    pub elapsed_time: i64,
    #[serde(default)]
    pub average_watts: f64,
    #[serde(default)]
    pub average_heartrate: f64,
    #[serde(default)]
    pub max_heartrate: f64,
    /// The segment this effort was recorded on. Strava occasionally ships
    /// efforts with no segment attached; those are skipped downstream.
    #[serde(default)]
    pub segment: Option<SegmentRef>,
}

/// Segment reference embedded in an effort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    /// Segment distance in meters
    #[serde(default)]
    pub distance: f64,
}

/// Summary activity from list endpoints (no segment efforts).
#[derive(Debug, Clone, Deserialize)]
pub struct ActivitySummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub activity_type: String,
    #[serde(default)]
    pub trainer: bool,
    #[serde(default)]
    pub manual: bool,
}
