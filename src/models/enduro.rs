// SPDX-License-Identifier: MIT

//! Enduro course definitions and derived attempt records.
//!
//! An enduro is a named, ordered set of course segments defined in static
//! configuration. Attempt records are derived wholesale by the aggregation
//! pass and never mutated afterwards; numeric fields are truncated to
//! integers and ids stringified so every storage backend sees the same shape.

use crate::error::{AppError, Result};
use crate::models::activity::{Activity, SegmentEffort};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Catalog of enduro definitions, loaded from `enduros.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnduroCatalog {
    /// Enduro names in display order.
    pub enduro_names: Vec<String>,
    /// Enduro name -> ordered required segment ids.
    pub enduros: IndexMap<String, Vec<String>>,
}

impl EnduroCatalog {
    /// Load the catalog from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::Storage(format!(
                "Failed to read enduro catalog {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        serde_json::from_str(&data)
            .map_err(|e| AppError::Protocol(format!("Invalid enduro catalog: {}", e)))
    }

    /// All distinct segment ids referenced by any enduro, in catalog order.
    pub fn all_segment_ids(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for segment_ids in self.enduros.values() {
            for id in segment_ids {
                if !seen.contains(id) {
                    seen.push(id.clone());
                }
            }
        }
        seen
    }
}

/// The best effort chosen for one segment of an enduro attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentAttempt {
    pub segment_id: String,
    pub segment_effort_id: String,
    pub name: String,
    /// Segment distance in whole meters
    pub distance: i64,
    /// Elapsed time in seconds
    pub elapsed_time: i64,
    pub average_watts: i64,
    pub average_heartrate: i64,
    pub max_heartrate: i64,
}

impl SegmentAttempt {
    /// Build from a raw effort. Returns `None` when the effort has no
    /// segment reference or no segment id (data-quality issue, skipped).
    pub fn from_effort(effort: &SegmentEffort) -> Option<Self> {
        let segment = effort.segment.as_ref()?;
        let segment_id = segment.id?;
        Some(Self {
            segment_id: segment_id.to_string(),
            segment_effort_id: effort.id.to_string(),
            name: segment.name.clone(),
            distance: segment.distance as i64,
            elapsed_time: effort.elapsed_time,
            average_watts: effort.average_watts as i64,
            average_heartrate: effort.average_heartrate as i64,
            max_heartrate: effort.max_heartrate as i64,
        })
    }
}

/// One rider's best composite performance across all segments of one enduro
/// during one activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnduroAttempt {
    /// Activity id, stringified
    pub id: String,
    pub name: String,
    pub description: String,
    pub device_name: String,
    /// Activity distance in whole meters
    pub distance: i64,
    /// Activity elapsed time in seconds
    pub elapsed_time: i64,
    /// Elevation gain in whole meters
    pub total_elevation_gain: i64,
    pub kudos_count: i64,
    pub max_speed: i64,
    pub calories: i64,
    /// Chosen best efforts, ordered as the enduro's segment list.
    pub segment_attempts: Vec<SegmentAttempt>,
    /// Sum of the chosen efforts' elapsed times, in seconds.
    pub enduro_time: i64,
}

impl EnduroAttempt {
    /// Assemble an attempt from a qualifying activity and its chosen efforts.
    pub fn new(activity: &Activity, segment_attempts: Vec<SegmentAttempt>) -> Self {
        let enduro_time = segment_attempts.iter().map(|a| a.elapsed_time).sum();
        Self {
            id: activity.id.to_string(),
            name: activity.name.clone(),
            description: activity.description.clone().unwrap_or_default(),
            device_name: activity.device_name.clone().unwrap_or_default(),
            distance: activity.distance as i64,
            elapsed_time: activity.elapsed_time,
            total_elevation_gain: activity.total_elevation_gain as i64,
            kudos_count: activity.kudos_count,
            max_speed: activity.max_speed as i64,
            calories: activity.calories as i64,
            segment_attempts,
            enduro_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::SegmentRef;

    fn effort(segment_id: Option<u64>, elapsed: i64) -> SegmentEffort {
        SegmentEffort {
            id: 900,
            elapsed_time: elapsed,
            average_watts: 210.7,
            average_heartrate: 150.2,
            max_heartrate: 181.9,
            segment: segment_id.map(|id| SegmentRef {
                id: Some(id),
                name: "Berms DH".to_string(),
                distance: 1234.9,
            }),
        }
    }

    #[test]
    fn test_segment_attempt_coerces_numeric_fields() {
        let attempt = SegmentAttempt::from_effort(&effort(Some(11), 95)).unwrap();
        assert_eq!(attempt.segment_id, "11");
        assert_eq!(attempt.segment_effort_id, "900");
        assert_eq!(attempt.distance, 1234);
        assert_eq!(attempt.average_watts, 210);
        assert_eq!(attempt.average_heartrate, 150);
        assert_eq!(attempt.max_heartrate, 181);
    }

    #[test]
    fn test_segment_attempt_rejects_missing_segment() {
        assert!(SegmentAttempt::from_effort(&effort(None, 95)).is_none());

        let mut no_id = effort(Some(11), 95);
        no_id.segment.as_mut().unwrap().id = None;
        assert!(SegmentAttempt::from_effort(&no_id).is_none());
    }

    #[test]
    fn test_enduro_attempt_sums_elapsed_times() {
        let activity = Activity {
            id: 5,
            name: "recovery ride".to_string(),
            distance: 6083.4,
            total_elevation_gain: 457.9,
            calories: 488.6,
            ..Default::default()
        };
        let attempts = vec![
            SegmentAttempt::from_effort(&effort(Some(1), 28)).unwrap(),
            SegmentAttempt::from_effort(&effort(Some(2), 45)).unwrap(),
        ];
        let attempt = EnduroAttempt::new(&activity, attempts);
        assert_eq!(attempt.id, "5");
        assert_eq!(attempt.distance, 6083);
        assert_eq!(attempt.total_elevation_gain, 457);
        assert_eq!(attempt.calories, 488);
        assert_eq!(attempt.enduro_time, 73);
        assert_eq!(attempt.description, "");
        assert_eq!(attempt.device_name, "");
    }
}
