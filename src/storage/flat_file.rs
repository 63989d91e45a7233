// SPDX-License-Identifier: MIT

//! Flat-file backend: one JSON file per document key.

use crate::error::{AppError, Result};
use crate::storage::Storage;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each document as `<dir>/<key>.json`.
pub struct FlatFileStore {
    dir: PathBuf,
}

impl FlatFileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FlatFileStore {
    fn read(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).map(Some).map_err(|e| {
                AppError::Storage(format!("Corrupt document {}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write(&self, key: &str, value: &Value) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::Storage(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;
        let path = self.path_for(key);
        let data = serde_json::to_string(value)
            .map_err(|e| AppError::Storage(format!("Failed to encode {}: {}", key, e)))?;
        fs::write(&path, data)
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path.display(), e)))
    }
}
