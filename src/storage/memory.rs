// SPDX-License-Identifier: MIT

//! In-memory key-value backend. Nothing survives the process; useful for
//! tests and dry runs.

use crate::error::Result;
use crate::storage::Storage;
use dashmap::DashMap;
use serde_json::Value;

#[derive(Default)]
pub struct MemoryStore {
    docs: DashMap<String, Value>,
}

impl Storage for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.docs.get(key).map(|doc| doc.clone()))
    }

    fn write(&self, key: &str, value: &Value) -> Result<()> {
        self.docs.insert(key.to_string(), value.clone());
        Ok(())
    }
}
