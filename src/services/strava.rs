// SPDX-License-Identifier: MIT

//! Strava API client for fetching activities and segments.
//!
//! Handles:
//! - Lazy OAuth token refresh (one exchange per process unless it fails)
//! - Quota enforcement through the persisted call log
//! - Blocking out quota waits instead of surfacing them as errors

use crate::error::{AppError, Result};
use crate::models::{Activity, ActivitySummary};
use crate::services::quota::QuotaTracker;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;

const DEFAULT_BASE_URL: &str = "https://www.strava.com/api/v3";
const DEFAULT_TOKEN_URL: &str = "https://www.strava.com/oauth/token";

/// Each wait empties a full quota window, so one retry should always
/// succeed; the bound only guards against a clock jumping backwards.
const MAX_QUOTA_WAITS: u32 = 3;

/// OAuth credentials, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub grant_type: String,
}

impl Credentials {
    pub fn new(client_id: String, client_secret: String, refresh_token: String) -> Self {
        Self {
            client_id,
            client_secret,
            refresh_token,
            grant_type: "refresh_token".to_string(),
        }
    }
}

/// Logical API method, resolved to a URL path by id substitution.
#[derive(Debug, Clone, Copy)]
pub enum Endpoint {
    ActivityById(u64),
    AthleteActivities,
    SegmentById(u64),
}

impl Endpoint {
    fn path(&self) -> String {
        match self {
            Endpoint::ActivityById(id) => format!("activities/{}", id),
            Endpoint::AthleteActivities => "athlete/activities".to_string(),
            Endpoint::SegmentById(id) => format!("segments/{}", id),
        }
    }
}

/// Rate-limited Strava API client.
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    credentials: Credentials,
    quota: QuotaTracker,
    /// Bearer token cached after the first exchange.
    access_token: Mutex<Option<String>>,
    /// Optional cap on a single quota sleep; callers see `QuotaDeadline`
    /// instead of a multi-hour block.
    max_quota_wait_secs: Option<u64>,
}

impl StravaClient {
    pub fn new(credentials: Credentials, quota: QuotaTracker) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            credentials,
            quota,
            access_token: Mutex::new(None),
            max_quota_wait_secs: None,
        }
    }

    /// Point the client at a different API host (tests).
    pub fn with_base_urls(mut self, base_url: String, token_url: String) -> Self {
        self.base_url = base_url;
        self.token_url = token_url;
        self
    }

    pub fn with_max_quota_wait(mut self, secs: Option<u64>) -> Self {
        self.max_quota_wait_secs = secs;
        self
    }

    /// Limits the call-budget tracker enforces (used for pacing estimates).
    pub fn quota_limits(&self) -> &crate::services::quota::QuotaLimits {
        self.quota.limits()
    }

    // ─── Typed API wrappers ──────────────────────────────────────────────────

    /// Get a detailed activity with all segment efforts.
    pub async fn get_activity(&self, activity_id: u64) -> Result<Activity> {
        self.request(
            Endpoint::ActivityById(activity_id),
            &[("include_all_efforts", "true".to_string())],
        )
        .await
    }

    /// List the authenticated athlete's activities (paginated, newest first).
    pub async fn list_athlete_activities(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivitySummary>> {
        self.request(
            Endpoint::AthleteActivities,
            &[
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ],
        )
        .await
    }

    /// Get a detailed segment, kept as an opaque document for storage.
    pub async fn get_segment(&self, segment_id: u64) -> Result<serde_json::Value> {
        self.request(Endpoint::SegmentById(segment_id), &[]).await
    }

    // ─── Auth ────────────────────────────────────────────────────────────────

    /// Get the cached bearer token, exchanging the refresh token on first use.
    ///
    /// The token endpoint does not count against the API quota.
    async fn authenticate(&self) -> Result<String> {
        let mut cached = self.access_token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("grant_type", self.credentials.grant_type.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Token exchange request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "Token exchange failed with HTTP {}: {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Undecodable token response: {}", e)))?;

        let token = token_response
            .access_token
            .ok_or_else(|| AppError::Auth("Token response has no access_token".to_string()))?;

        tracing::info!("Access token obtained");
        *cached = Some(token.clone());
        Ok(token)
    }

    // ─── Request path ────────────────────────────────────────────────────────

    /// Block until the call log grants a slot.
    ///
    /// Quota exhaustion is a scheduling delay, never an error: we sleep out
    /// the computed wait and re-reserve. The slot timestamp is only logged
    /// once the call is actually about to be made.
    async fn wait_for_slot(&self) -> Result<()> {
        for _ in 0..=MAX_QUOTA_WAITS {
            let wait = self.quota.acquire_now()?;
            if wait == 0 {
                return Ok(());
            }
            if let Some(cap) = self.max_quota_wait_secs {
                if wait > cap {
                    return Err(AppError::QuotaDeadline {
                        wait_secs: wait,
                        cap_secs: cap,
                    });
                }
            }
            tracing::warn!(wait_secs = wait, "API quota exhausted, resting");
            tokio::time::sleep(Duration::from_secs(wait)).await;
        }
        Err(AppError::Internal(anyhow::anyhow!(
            "No quota slot granted after {} waits",
            MAX_QUOTA_WAITS
        )))
    }

    /// Authenticated GET with quota enforcement and JSON decoding.
    async fn request<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: Endpoint,
        params: &[(&str, String)],
    ) -> Result<T> {
        self.wait_for_slot().await?;
        let token = self.authenticate().await?;

        let url = format!("{}/{}", self.base_url, endpoint.path());
        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 401 {
                return Err(AppError::Auth(format!("Request rejected: {}", body)));
            }
            return Err(AppError::Protocol(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Protocol(format!("JSON parse error: {}", e)))
    }
}

/// Token endpoint response. `access_token` stays optional so its absence
/// maps to an auth error rather than a decode error.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_paths_substitute_ids() {
        assert_eq!(Endpoint::ActivityById(42).path(), "activities/42");
        assert_eq!(Endpoint::AthleteActivities.path(), "athlete/activities");
        assert_eq!(Endpoint::SegmentById(7).path(), "segments/7");
    }

    #[test]
    fn test_credentials_default_grant_type() {
        let creds = Credentials::new("id".into(), "secret".into(), "refresh".into());
        assert_eq!(creds.grant_type, "refresh_token");
    }
}
