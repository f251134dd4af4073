use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::streak::{DayTransition, StreakRecord};

/// Inputs that drive a streak session.
///
/// The auth layer and the UI send these to the session driver instead of
/// calling into the orchestrator directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SignedIn { user_id: String },
    SignedOut,
    /// Reload and reconcile for the current user.
    Refresh,
    /// User confirmed a relapse.
    Reset,
    /// Push the in-memory record to the remote store.
    Sync,
    Shutdown,
}

/// Where `load` found the record it reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    Local,
    Remote,
    Created,
    /// Neither store produced a record; the one already in memory was kept.
    Session,
}

/// Every state change of a streak session produces an Event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StreakEvent {
    StreakLoaded {
        user_id: String,
        source: RecordSource,
        transition: DayTransition,
        record: StreakRecord,
        at: DateTime<Utc>,
    },
    StreakReset {
        user_id: String,
        relapses: u32,
        at: DateTime<Utc>,
    },
    StreakSynced {
        user_id: String,
        at: DateTime<Utc>,
    },
    SignedOut {
        at: DateTime<Utc>,
    },
    /// A store write or read failed; the session carried on.
    StoreFailed {
        store: String,
        operation: String,
        message: String,
        at: DateTime<Utc>,
    },
}
