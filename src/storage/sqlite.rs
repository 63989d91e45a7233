// SPDX-License-Identifier: MIT

//! SQLite backend: documents in a single keyed table.

use crate::error::{AppError, Result};
use crate::storage::Storage;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;

/// Keeps documents in a `documents (key, body)` table, created on open.
///
/// `rusqlite::Connection` is not `Sync`, so access is serialized behind a
/// mutex; the workload is a handful of whole-document reads and writes.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let conn = Connection::open(path.as_ref()).map_err(|e| {
            AppError::Storage(format!(
                "Failed to open database {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                key  TEXT PRIMARY KEY,
                body TEXT NOT NULL
            )",
        )
        .map_err(|e| AppError::Storage(format!("Failed to create schema: {}", e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Storage("Database lock poisoned".to_string()))
    }
}

impl Storage for SqliteStore {
    fn read(&self, key: &str) -> Result<Option<Value>> {
        let conn = self.lock()?;
        let body: Option<String> = conn
            .query_row("SELECT body FROM documents WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| AppError::Storage(format!("Failed to read {}: {}", key, e)))?;
        match body {
            Some(body) => serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| AppError::Storage(format!("Corrupt document {}: {}", key, e))),
            None => Ok(None),
        }
    }

    fn write(&self, key: &str, value: &Value) -> Result<()> {
        let body = serde_json::to_string(value)
            .map_err(|e| AppError::Storage(format!("Failed to encode {}: {}", key, e)))?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO documents (key, body) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET body = excluded.body",
            rusqlite::params![key, body],
        )
        .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", key, e)))?;
        Ok(())
    }
}
