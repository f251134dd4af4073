use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed local-store key the streak record lives under.
pub const STREAK_KEY: &str = "@quitter_streak";

/// Remote collection holding one streak document per user.
pub const STREAK_COLLECTION: &str = "streaks";

/// The persisted streak state of one user.
///
/// Stored verbatim as a JSON object (camelCase field names) in both the
/// local key-value store and the remote document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    pub user_id: String,
    /// Consecutive calendar days since the last reset.
    #[serde(default)]
    pub current_streak: u32,
    /// Largest `current_streak` ever observed.
    #[serde(default)]
    pub longest_streak: u32,
    /// Instant the current streak began; drives the elapsed timer.
    pub start_date: DateTime<Utc>,
    /// Instant of the last state-changing reconciliation.
    pub last_check_date: DateTime<Utc>,
    /// Cumulative number of resets.
    #[serde(default)]
    pub relapses: u32,
}

impl StreakRecord {
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    pub fn from_json(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}
