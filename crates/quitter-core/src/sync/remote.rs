//! Remote per-user document stores.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// Document database reachable from every device of a user.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch `collection/id`; `None` when the document does not exist.
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Write `collection/id`. With `merge`, only the given top-level fields
    /// are replaced and other fields of an existing document survive.
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: &Value,
        merge: bool,
    ) -> Result<(), StoreError>;

    /// Short name for log lines.
    fn name(&self) -> &'static str;

    /// `false` when no backend is configured and writes go nowhere.
    fn enabled(&self) -> bool {
        true
    }
}

/// Stand-in used when no remote backend is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledRemoteStore;

#[async_trait]
impl RemoteStore for DisabledRemoteStore {
    async fn get_document(&self, _collection: &str, _id: &str) -> Result<Option<Value>, StoreError> {
        Ok(None)
    }

    async fn set_document(
        &self,
        _collection: &str,
        _id: &str,
        _data: &Value,
        _merge: bool,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "disabled"
    }

    fn enabled(&self) -> bool {
        false
    }
}

/// In-memory document store keyed by `(collection, id)`.
#[derive(Default)]
pub struct MemoryRemoteStore {
    docs: Mutex<HashMap<(String, String), Value>>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peek(&self, collection: &str, id: &str) -> Option<Value> {
        self.docs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
    }

    pub fn insert(&self, collection: &str, id: &str, data: Value) {
        self.docs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((collection.to_string(), id.to_string()), data);
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.peek(collection, id))
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: &Value,
        merge: bool,
    ) -> Result<(), StoreError> {
        let incoming = data
            .as_object()
            .ok_or_else(|| StoreError::MalformedDocument("document body must be an object".into()))?;

        let mut docs = self.docs.lock().unwrap_or_else(|e| e.into_inner());
        let entry = docs
            .entry((collection.to_string(), id.to_string()))
            .or_insert_with(|| Value::Object(Default::default()));

        if merge {
            if let Some(existing) = entry.as_object_mut() {
                for (k, v) in incoming {
                    existing.insert(k.clone(), v.clone());
                }
                return Ok(());
            }
        }
        *entry = Value::Object(incoming.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
