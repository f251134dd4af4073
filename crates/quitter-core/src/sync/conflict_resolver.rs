//! Choosing between diverged local and remote streak records.

use serde::{Deserialize, Serialize};

use crate::streak::StreakRecord;

/// How `load` treats the two stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePolicy {
    /// A local record wins whenever present; remote is only read when local is empty.
    #[default]
    LocalFirst,
    /// Read both stores and keep the record checked most recently.
    Freshest,
}

/// Merge decision for a pair of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    UseLocal,
    UseRemote,
}

/// Pick the more advanced of two records.
///
/// The later `last_check_date` wins; on a tie the record that has seen more
/// relapses wins (a reset on another device must not be undone); remaining
/// ties keep local.
pub fn resolve_conflict(local: &StreakRecord, remote: &StreakRecord) -> MergeDecision {
    if remote.last_check_date > local.last_check_date {
        return MergeDecision::UseRemote;
    }
    if remote.last_check_date == local.last_check_date && remote.relapses > local.relapses {
        return MergeDecision::UseRemote;
    }
    MergeDecision::UseLocal
}
