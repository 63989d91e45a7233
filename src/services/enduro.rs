// SPDX-License-Identifier: MIT

//! Best-effort enduro aggregation.
//!
//! Pure over its inputs: no I/O, no shared state across (activity, enduro)
//! pairs. Each run recomputes the full attempt set from scratch.

use crate::models::{Activity, EnduroAttempt, EnduroCatalog, SegmentAttempt};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Compute enduro attempts for every (enduro, activity) pair.
///
/// An activity qualifies for an enduro when it covers every required segment;
/// it may qualify for zero, one, or several enduros independently. Attempts
/// keep the input activity iteration order — sorting is a presentation
/// concern. Only enduros with at least one attempt appear in the output.
pub fn collect_enduro_attempts(
    activities: &IndexMap<String, Activity>,
    catalog: &EnduroCatalog,
) -> IndexMap<String, Vec<EnduroAttempt>> {
    let mut enduro_attempts: IndexMap<String, Vec<EnduroAttempt>> = IndexMap::new();

    for enduro_name in &catalog.enduro_names {
        let Some(required) = catalog.enduros.get(enduro_name) else {
            tracing::warn!(enduro = %enduro_name, "Enduro named but not defined, skipping");
            continue;
        };
        // An enduro with no segments would trivially match every ride;
        // treat it as a catalog defect instead.
        if required.is_empty() {
            tracing::warn!(enduro = %enduro_name, "Enduro has no segments, skipping");
            continue;
        }

        for activity in activities.values() {
            let best = best_segment_attempts(activity, required);
            // Exact coverage: one best effort for every required segment.
            if best.len() != required.len() {
                continue;
            }
            let mut best = best;
            let chosen: Vec<SegmentAttempt> =
                required.iter().filter_map(|id| best.remove(id)).collect();
            enduro_attempts
                .entry(enduro_name.clone())
                .or_default()
                .push(EnduroAttempt::new(activity, chosen));
        }
    }

    enduro_attempts
}

/// Scan one activity's effort list, keeping the fastest effort per required
/// segment. Repeated laps over the same segment are expected; only the
/// minimum elapsed time within this single activity survives.
pub fn best_segment_attempts(
    activity: &Activity,
    required: &[String],
) -> HashMap<String, SegmentAttempt> {
    let mut best: HashMap<String, SegmentAttempt> = HashMap::new();

    for effort in &activity.segment_efforts {
        let Some(segment_id) = effort.segment.as_ref().and_then(|s| s.id) else {
            tracing::warn!(
                activity_id = activity.id,
                effort_id = effort.id,
                "Segment effort has no segment id, skipping"
            );
            continue;
        };
        let key = segment_id.to_string();
        if !required.contains(&key) {
            continue;
        }
        let improves = best
            .get(&key)
            .is_none_or(|current| current.elapsed_time > effort.elapsed_time);
        if improves {
            if let Some(attempt) = SegmentAttempt::from_effort(effort) {
                best.insert(key, attempt);
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SegmentEffort, SegmentRef};

    fn effort(segment_id: u64, name: &str, elapsed: i64) -> SegmentEffort {
        SegmentEffort {
            id: segment_id * 1000 + elapsed as u64,
            elapsed_time: elapsed,
            segment: Some(SegmentRef {
                id: Some(segment_id),
                name: name.to_string(),
                distance: 500.0,
            }),
            ..Default::default()
        }
    }

    fn activity(id: u64, efforts: Vec<SegmentEffort>) -> Activity {
        Activity {
            id,
            name: format!("ride {}", id),
            segment_efforts: efforts,
            ..Default::default()
        }
    }

    fn catalog(enduros: &[(&str, &[&str])]) -> EnduroCatalog {
        EnduroCatalog {
            enduro_names: enduros.iter().map(|(n, _)| n.to_string()).collect(),
            enduros: enduros
                .iter()
                .map(|(n, ids)| (n.to_string(), ids.iter().map(|s| s.to_string()).collect()))
                .collect(),
        }
    }

    fn pool(activities: Vec<Activity>) -> IndexMap<String, Activity> {
        activities
            .into_iter()
            .map(|a| (a.id.to_string(), a))
            .collect()
    }

    #[test]
    fn test_repeated_lap_keeps_minimum_elapsed_time() {
        // seg1 ridden twice (30s then 28s), seg2 once (45s).
        let acts = pool(vec![activity(
            1,
            vec![
                effort(1, "seg1", 30),
                effort(2, "seg2", 45),
                effort(1, "seg1", 28),
            ],
        )]);
        let cat = catalog(&[("teds", &["1", "2"])]);

        let result = collect_enduro_attempts(&acts, &cat);
        let attempts = &result["teds"];
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].segment_attempts[0].elapsed_time, 28);
        assert_eq!(attempts[0].segment_attempts[1].elapsed_time, 45);
        assert_eq!(attempts[0].enduro_time, 73);
    }

    #[test]
    fn test_incomplete_coverage_produces_no_attempt() {
        let acts = pool(vec![activity(1, vec![effort(1, "seg1", 30)])]);
        let cat = catalog(&[("teds", &["1", "2"])]);

        let result = collect_enduro_attempts(&acts, &cat);
        assert!(result.is_empty());
    }

    #[test]
    fn test_overlapping_enduros_produce_independent_attempts() {
        let acts = pool(vec![activity(
            1,
            vec![
                effort(1, "seg1", 30),
                effort(2, "seg2", 45),
                effort(3, "seg3", 60),
            ],
        )]);
        let cat = catalog(&[("short", &["1", "2"]), ("long", &["2", "3"])]);

        let result = collect_enduro_attempts(&acts, &cat);
        assert_eq!(result["short"].len(), 1);
        assert_eq!(result["long"].len(), 1);
        assert_eq!(result["short"][0].enduro_time, 75);
        assert_eq!(result["long"][0].enduro_time, 105);
    }

    #[test]
    fn test_segment_order_follows_enduro_definition() {
        // Efforts arrive out of course order.
        let acts = pool(vec![activity(
            1,
            vec![effort(2, "seg2", 45), effort(1, "seg1", 30)],
        )]);
        let cat = catalog(&[("teds", &["1", "2"])]);

        let result = collect_enduro_attempts(&acts, &cat);
        let attempts = &result["teds"][0].segment_attempts;
        assert_eq!(attempts[0].segment_id, "1");
        assert_eq!(attempts[1].segment_id, "2");
    }

    #[test]
    fn test_effort_without_segment_is_skipped_not_fatal() {
        let mut bad = effort(1, "seg1", 10);
        bad.segment = None;
        let acts = pool(vec![activity(
            1,
            vec![bad, effort(1, "seg1", 30), effort(2, "seg2", 45)],
        )]);
        let cat = catalog(&[("teds", &["1", "2"])]);

        let result = collect_enduro_attempts(&acts, &cat);
        // The anonymous effort is ignored; the named 30s one wins.
        assert_eq!(result["teds"][0].segment_attempts[0].elapsed_time, 30);
    }

    #[test]
    fn test_empty_enduro_is_rejected_not_trivially_matched() {
        let acts = pool(vec![activity(1, vec![effort(1, "seg1", 30)])]);
        let cat = catalog(&[("hollow", &[])]);

        let result = collect_enduro_attempts(&acts, &cat);
        assert!(result.is_empty());
    }

    #[test]
    fn test_attempts_keep_input_activity_order() {
        let acts = pool(vec![
            activity(9, vec![effort(1, "seg1", 50)]),
            activity(3, vec![effort(1, "seg1", 20)]),
        ]);
        let cat = catalog(&[("solo", &["1"])]);

        let result = collect_enduro_attempts(&acts, &cat);
        let ids: Vec<&str> = result["solo"].iter().map(|a| a.id.as_str()).collect();
        // Not sorted by time: input iteration order is preserved.
        assert_eq!(ids, vec!["9", "3"]);
    }
}
