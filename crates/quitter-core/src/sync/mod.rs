//! Remote document stores and dual-store reconciliation.
//!
//! The streak record is mirrored into a per-user document (`streaks/{userId}`)
//! so a user keeps their streak across devices.

pub mod conflict_resolver;
pub mod document_codec;
pub mod firestore;
pub mod remote;

use std::sync::Arc;

pub use conflict_resolver::{resolve_conflict, MergeDecision, ReconcilePolicy};
pub use firestore::FirestoreRemoteStore;
pub use remote::{DisabledRemoteStore, MemoryRemoteStore, RemoteStore};

use crate::error::StoreError;
use crate::storage::{RemoteBackend, SyncSection};

/// Instantiate the remote store selected by the `[sync]` config section.
pub fn remote_from_config(section: &SyncSection) -> Result<Arc<dyn RemoteStore>, StoreError> {
    Ok(match section.backend {
        RemoteBackend::None => Arc::new(DisabledRemoteStore),
        RemoteBackend::Memory => Arc::new(MemoryRemoteStore::new()),
        RemoteBackend::Firestore => Arc::new(FirestoreRemoteStore::from_config(section)?),
    })
}
