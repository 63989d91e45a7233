// SPDX-License-Identifier: MIT

//! Swappable document storage.
//!
//! Every backend exposes the same contract: opaque JSON documents addressed
//! by a well-known key. The backend is an external collaborator chosen by
//! configuration; nothing above this layer knows which one is in use.

pub mod flat_file;
pub mod memory;
pub mod sqlite;

pub use flat_file::FlatFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::config::StorageKind;
use crate::error::Result;
use serde_json::Value;
use std::path::Path;

/// Document key for the full activity map.
pub const ALL_ACTIVITIES: &str = "all_activities";
/// Document key for the MTB-ride subset.
pub const MTB_RIDE_ACTIVITIES: &str = "mtb_ride_activities";
/// Document key for derived enduro attempts.
pub const ENDURO_ATTEMPTS: &str = "enduro_attempts";
/// Document key for detailed segment records.
pub const DETAILED_SEGMENTS: &str = "detailed_segments";

/// Uniform read/write contract over opaque JSON documents.
pub trait Storage: Send + Sync {
    /// Read a document, `None` when the key has never been written.
    fn read(&self, key: &str) -> Result<Option<Value>>;

    /// Write a document, replacing any previous value.
    fn write(&self, key: &str, value: &Value) -> Result<()>;
}

/// Open the backend selected by configuration.
pub fn open(kind: StorageKind, data_dir: &Path) -> Result<Box<dyn Storage>> {
    match kind {
        StorageKind::FlatFile => Ok(Box::new(FlatFileStore::new(data_dir))),
        StorageKind::Memory => Ok(Box::new(MemoryStore::default())),
        StorageKind::Sqlite => Ok(Box::new(SqliteStore::open(data_dir.join("storage.db"))?)),
    }
}
