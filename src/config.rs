// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! Strava credentials are read once at startup; the refresh token is the
//! long-lived secret, access tokens are obtained lazily by the client and
//! never persisted.

use std::env;
use std::path::PathBuf;

/// Which storage backend holds cached activities and derived attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// One JSON file per document key under the data directory.
    FlatFile,
    /// In-memory key-value store (process lifetime only).
    Memory,
    /// SQLite database under the data directory.
    Sqlite,
}

impl StorageKind {
    /// Parse a backend name as given on the CLI or in `STORAGE_BACKEND`.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_ascii_lowercase().as_str() {
            "flat-file" | "json" => Ok(StorageKind::FlatFile),
            "memory" => Ok(StorageKind::Memory),
            "sqlite" => Ok(StorageKind::Sqlite),
            _ => Err(ConfigError::InvalidStorageBackend(s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava OAuth client ID (public)
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Long-lived OAuth refresh token
    pub strava_refresh_token: String,
    /// Directory holding the enduro catalog, call log, and flat-file storage
    pub data_dir: PathBuf,
    /// Storage backend for cached activities and derived attempts
    pub storage: StorageKind,
    /// Optional cap on how long a single call may sleep waiting for quota.
    /// `None` preserves the original behavior of blocking up to a full day.
    pub max_quota_wait_secs: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let storage = match env::var("STORAGE_BACKEND") {
            Ok(v) => StorageKind::parse(&v)?,
            Err(_) => StorageKind::FlatFile,
        };

        let max_quota_wait_secs = match env::var("MAX_QUOTA_WAIT_SECS") {
            Ok(v) => Some(
                v.parse()
                    .map_err(|_| ConfigError::Invalid("MAX_QUOTA_WAIT_SECS"))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            strava_client_id: env::var("STRAVA_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            strava_client_secret: env::var("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            strava_refresh_token: env::var("STRAVA_REFRESH_TOKEN")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_REFRESH_TOKEN"))?,
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            storage,
            max_quota_wait_secs,
        })
    }

    /// Path of the persisted API call log.
    pub fn call_log_path(&self) -> PathBuf {
        self.data_dir.join("strava_api_calls.json")
    }

    /// Path of the enduro catalog file.
    pub fn enduros_path(&self) -> PathBuf {
        self.data_dir.join("enduros.json")
    }
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            strava_refresh_token: "test_refresh_token".to_string(),
            data_dir: PathBuf::from("data"),
            storage: StorageKind::Memory,
            max_quota_wait_secs: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Unknown storage backend: {0} (expected flat-file, memory, or sqlite)")]
    InvalidStorageBackend(String),
}
