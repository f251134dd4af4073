//! Device-local key-value store for the streak record.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::database::Database;
use crate::error::StoreError;

/// Key-value persistence on the current device.
///
/// Values are JSON documents; a missing key reads as `None`.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;
    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError>;
}

/// Local store over the SQLite `kv` table.
pub struct SqliteLocalStore {
    db: Mutex<Database>,
}

impl SqliteLocalStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    fn with_db<T>(
        &self,
        f: impl FnOnce(&Database) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let guard = self
            .db
            .lock()
            .map_err(|_| StoreError::QueryFailed("database mutex poisoned".into()))?;
        f(&guard)
    }
}

#[async_trait]
impl LocalStore for SqliteLocalStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let raw = self.with_db(|db| Ok(db.kv_get(key)?))?;
        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        let text = serde_json::to_string(value)?;
        self.with_db(|db| Ok(db.kv_set(key, &text)?))
    }
}

/// Process-local store, used in tests and for throwaway sessions.
#[derive(Default)]
pub struct MemoryLocalStore {
    entries: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a stored value, bypassing the async interface.
    pub fn peek(&self, key: &str) -> Option<serde_json::Value> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    pub fn insert(&self, key: &str, value: serde_json::Value) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        self.insert(key, value.clone());
        Ok(())
    }
}
