// SPDX-License-Identifier: MIT

//! Fetch-and-update pipeline.
//!
//! Pulls summaries and detailed activities through the rate-limited client,
//! merges them into the stored activity maps (newest upload first), and runs
//! the aggregation pass over the cached MTB rides. All storage access goes
//! through the configured backend; this layer never touches files directly.

use crate::error::{AppError, Result};
use crate::models::{Activity, ActivitySummary, EnduroAttempt, EnduroCatalog};
use crate::services::enduro::collect_enduro_attempts;
use crate::services::strava::StravaClient;
use crate::storage::{
    Storage, ALL_ACTIVITIES, DETAILED_SEGMENTS, ENDURO_ATTEMPTS, MTB_RIDE_ACTIVITIES,
};
use indexmap::IndexMap;
use serde_json::Value;

/// Strava caps list endpoints at 200 items per page.
const MAX_PAGE_SIZE: u32 = 200;

/// Orchestrates API fetches and storage updates.
pub struct ActivitySync {
    strava: StravaClient,
    storage: Box<dyn Storage>,
}

impl ActivitySync {
    pub fn new(strava: StravaClient, storage: Box<dyn Storage>) -> Self {
        Self { strava, storage }
    }

    // ─── Update operations ───────────────────────────────────────────────────

    /// Fetch the most recent `count` summaries (capped at one page) and pull
    /// details for any activity not yet cached. Returns how many new
    /// detailed activities were fetched.
    pub async fn update_activities(&self, count: u32) -> Result<usize> {
        let per_page = count.min(MAX_PAGE_SIZE);
        let summaries = self.strava.list_athlete_activities(1, per_page).await?;
        let fetched = self.merge_new_activities(&summaries).await?;
        tracing::info!(
            summaries = summaries.len(),
            fetched,
            "Recent activities updated"
        );
        Ok(fetched)
    }

    /// Walk the full activity history page by page, then fetch details for
    /// everything unseen. This can take hours against a cold cache; the
    /// client sleeps out quota windows as needed.
    pub async fn generate_all_activities(&self) -> Result<usize> {
        let mut summaries = Vec::new();
        let mut page = 1;
        loop {
            let batch = self
                .strava
                .list_athlete_activities(page, MAX_PAGE_SIZE)
                .await?;
            if batch.is_empty() {
                break;
            }
            summaries.extend(batch);
            page += 1;
        }

        let limits = self.strava.quota_limits();
        let calls_per_window = (limits.short_max.saturating_sub(1)).max(1);
        let estimated_minutes =
            summaries.len() / calls_per_window * (limits.short_window as usize / 60);
        tracing::info!(
            summaries = summaries.len(),
            estimated_minutes,
            "Starting detailed fetch of full history"
        );

        let fetched = self.merge_new_activities(&summaries).await?;
        tracing::info!(fetched, "Full history generated");
        Ok(fetched)
    }

    /// Fetch a detailed segment for every segment referenced by any enduro
    /// and store the result set. Returns how many segments were stored.
    pub async fn update_enduro_segments(&self, catalog: &EnduroCatalog) -> Result<usize> {
        let mut segments: IndexMap<String, Value> = IndexMap::new();
        for segment_id in catalog.all_segment_ids() {
            let Ok(numeric_id) = segment_id.parse::<u64>() else {
                tracing::warn!(segment_id = %segment_id, "Non-numeric segment id in catalog, skipping");
                continue;
            };
            let detail = self.strava.get_segment(numeric_id).await?;
            segments.insert(segment_id, detail);
        }
        self.write_doc(DETAILED_SEGMENTS, &segments)?;
        tracing::info!(count = segments.len(), "Detailed segments updated");
        Ok(segments.len())
    }

    /// Recompute enduro attempts from the cached MTB rides and store the
    /// result wholesale. Returns the total number of attempts.
    pub fn update_enduro_attempts(&self, catalog: &EnduroCatalog) -> Result<usize> {
        let activities = self.read_activity_map(MTB_RIDE_ACTIVITIES)?;
        let attempts = collect_enduro_attempts(&activities, catalog);
        let total = attempts.values().map(Vec::len).sum();
        self.write_doc(ENDURO_ATTEMPTS, &attempts)?;
        tracing::info!(
            enduros = attempts.len(),
            attempts = total,
            "Enduro attempts updated"
        );
        Ok(total)
    }

    // ─── Read operations ─────────────────────────────────────────────────────

    /// Stored attempts for one enduro, in stored (activity) order.
    pub fn stored_enduro_attempts(&self, enduro_name: &str) -> Result<Vec<EnduroAttempt>> {
        let doc = self.storage.read(ENDURO_ATTEMPTS)?.ok_or_else(|| {
            AppError::NotFound("Enduro attempts (run update-attempts first)".to_string())
        })?;
        let mut attempts: IndexMap<String, Vec<EnduroAttempt>> = serde_json::from_value(doc)
            .map_err(|e| AppError::Storage(format!("Corrupt enduro attempts: {}", e)))?;
        attempts
            .shift_remove(enduro_name)
            .ok_or_else(|| AppError::NotFound(format!("Attempts for enduro {}", enduro_name)))
    }

    /// The cached MTB-ride map (may be empty before any sync).
    pub fn stored_mtb_rides(&self) -> Result<IndexMap<String, Activity>> {
        self.read_activity_map(MTB_RIDE_ACTIVITIES)
    }

    // ─── Internals ───────────────────────────────────────────────────────────

    /// Fetch details for unseen summaries and rewrite both activity maps,
    /// newest upload first.
    async fn merge_new_activities(&self, summaries: &[ActivitySummary]) -> Result<usize> {
        let mut all = self.read_activity_map(ALL_ACTIVITIES)?;
        let mut mtb = self.read_activity_map(MTB_RIDE_ACTIVITIES)?;

        let mut fetched = 0;
        for summary in summaries {
            let key = summary.id.to_string();
            if !all.contains_key(&key) {
                let detail = self.strava.get_activity(summary.id).await?;
                all.insert(key.clone(), detail);
                fetched += 1;
            }
            if !mtb.contains_key(&key) {
                if let Some(detail) = all.get(&key) {
                    if detail.is_mtb_ride() {
                        mtb.insert(key, detail.clone());
                    }
                }
            }
        }

        sort_by_upload_desc(&mut all);
        sort_by_upload_desc(&mut mtb);
        self.write_doc(ALL_ACTIVITIES, &all)?;
        self.write_doc(MTB_RIDE_ACTIVITIES, &mtb)?;
        Ok(fetched)
    }

    fn read_activity_map(&self, key: &str) -> Result<IndexMap<String, Activity>> {
        match self.storage.read(key)? {
            Some(doc) => serde_json::from_value(doc)
                .map_err(|e| AppError::Storage(format!("Corrupt document {}: {}", key, e))),
            None => Ok(IndexMap::new()),
        }
    }

    fn write_doc<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let doc = serde_json::to_value(value)
            .map_err(|e| AppError::Storage(format!("Failed to encode {}: {}", key, e)))?;
        self.storage.write(key, &doc)
    }
}

/// Newest upload first, matching the stored order users expect.
fn sort_by_upload_desc(map: &mut IndexMap<String, Activity>) {
    map.sort_by(|_, a, _, b| b.upload_id.cmp(&a.upload_id));
}
