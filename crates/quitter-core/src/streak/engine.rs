//! Streak reconciliation engine.
//!
//! Pure transitions over [`StreakRecord`]: every function takes the current
//! instant explicitly and returns a new record, so callers can compare the
//! result with the input to decide whether a write is needed.
//!
//! ## Day transitions
//!
//! ```text
//! elapsed calendar days since lastCheckDate
//!   < 0  -> ClockSkew  (unchanged)
//!     0  -> SameDay    (unchanged)
//!     1  -> NextDay    (currentStreak + 1)
//!   > 1  -> Missed     (currentStreak = 0, relapses + 1)
//! ```
//!
//! Calendar days are counted in a time zone (the system local zone unless
//! one of the `*_in` variants is used); time of day is ignored.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::record::StreakRecord;

/// Days of continuous streak after which brain rewiring reads 100%.
pub const BRAIN_REWIRING_HORIZON_DAYS: u32 = 90;

/// Outcome of comparing a record's last check with the current instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayTransition {
    SameDay,
    NextDay,
    /// More than one calendar day passed without a check-in.
    Missed { days: i64 },
    /// `now` lies on a calendar day before the last check.
    ClockSkew { days: i64 },
}

impl DayTransition {
    pub fn from_elapsed_days(days: i64) -> Self {
        match days {
            0 => DayTransition::SameDay,
            1 => DayTransition::NextDay,
            d if d > 1 => DayTransition::Missed { days: d },
            d => DayTransition::ClockSkew { days: d },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DayTransition::SameDay => "same_day",
            DayTransition::NextDay => "next_day",
            DayTransition::Missed { .. } => "missed",
            DayTransition::ClockSkew { .. } => "clock_skew",
        }
    }
}

/// Number of calendar-day boundaries between `from` and `to` in `tz`.
pub fn elapsed_calendar_days<Tz: TimeZone>(
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    tz: &Tz,
) -> i64 {
    let from_day = from.with_timezone(tz).date_naive();
    let to_day = to.with_timezone(tz).date_naive();
    to_day.signed_duration_since(from_day).num_days()
}

/// Tunables for the streak engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Streak length that maps to 100% brain rewiring.
    pub brain_rewiring_horizon_days: u32,
    /// Also move `start_date` to `now` when a missed day resets the streak.
    /// Off by default: the missed-day path only zeroes the counter.
    pub reset_start_on_missed_day: bool,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            brain_rewiring_horizon_days: BRAIN_REWIRING_HORIZON_DAYS,
            reset_start_on_missed_day: false,
        }
    }
}

/// Streak engine.
#[derive(Debug, Clone, Default)]
pub struct StreakEngine {
    config: StreakConfig,
}

impl StreakEngine {
    /// Create an engine with default config
    pub fn new() -> Self {
        Self {
            config: StreakConfig::default(),
        }
    }

    /// Create with custom config
    pub fn with_config(config: StreakConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StreakConfig {
        &self.config
    }

    /// A fresh record: zero counters, both dates at `now`.
    pub fn create_initial(&self, user_id: &str, now: DateTime<Utc>) -> StreakRecord {
        StreakRecord {
            user_id: user_id.to_string(),
            current_streak: 0,
            longest_streak: 0,
            start_date: now,
            last_check_date: now,
            relapses: 0,
        }
    }

    /// Classify the time since `record.last_check_date` in the local zone.
    pub fn classify(&self, record: &StreakRecord, now: DateTime<Utc>) -> DayTransition {
        self.classify_in(record, now, &Local)
    }

    pub fn classify_in<Tz: TimeZone>(
        &self,
        record: &StreakRecord,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> DayTransition {
        DayTransition::from_elapsed_days(elapsed_calendar_days(record.last_check_date, now, tz))
    }

    /// Reconcile `record` against `now`, counting days in the local zone.
    pub fn check_and_update(&self, record: &StreakRecord, now: DateTime<Utc>) -> StreakRecord {
        self.check_and_update_in(record, now, &Local)
    }

    /// Reconcile `record` against `now`, counting days in `tz`.
    ///
    /// Same-day and clock-skewed calls return a value equal to the input.
    pub fn check_and_update_in<Tz: TimeZone>(
        &self,
        record: &StreakRecord,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> StreakRecord {
        self.apply(record, self.classify_in(record, now, tz), now)
    }

    /// Apply an already computed transition.
    pub fn apply(
        &self,
        record: &StreakRecord,
        transition: DayTransition,
        now: DateTime<Utc>,
    ) -> StreakRecord {
        match transition {
            DayTransition::SameDay | DayTransition::ClockSkew { .. } => record.clone(),
            DayTransition::NextDay => {
                let current = record.current_streak.saturating_add(1);
                StreakRecord {
                    current_streak: current,
                    longest_streak: record.longest_streak.max(current),
                    last_check_date: now,
                    ..record.clone()
                }
            }
            DayTransition::Missed { .. } => StreakRecord {
                current_streak: 0,
                relapses: record.relapses.saturating_add(1),
                last_check_date: now,
                start_date: if self.config.reset_start_on_missed_day {
                    now
                } else {
                    record.start_date
                },
                ..record.clone()
            },
        }
    }

    /// Explicit relapse: zero the streak and restart the clock at `now`.
    pub fn reset(&self, record: &StreakRecord, now: DateTime<Utc>) -> StreakRecord {
        StreakRecord {
            current_streak: 0,
            start_date: now,
            last_check_date: now,
            relapses: record.relapses.saturating_add(1),
            ..record.clone()
        }
    }

    /// Progress toward the rewiring horizon, 0..=100.
    pub fn brain_rewiring(&self, current_streak: u32) -> u8 {
        brain_rewiring_for_horizon(current_streak, self.config.brain_rewiring_horizon_days)
    }
}

fn brain_rewiring_for_horizon(current_streak: u32, horizon_days: u32) -> u8 {
    if horizon_days == 0 || current_streak >= horizon_days {
        return 100;
    }
    // round(current / horizon * 100), half rounding up
    let horizon = u64::from(horizon_days);
    let scaled = (u64::from(current_streak) * 200 + horizon) / (2 * horizon);
    scaled.min(100) as u8
}

pub fn create_initial_streak(user_id: &str, now: DateTime<Utc>) -> StreakRecord {
    StreakEngine::new().create_initial(user_id, now)
}

pub fn check_and_update_streak(record: &StreakRecord, now: DateTime<Utc>) -> StreakRecord {
    StreakEngine::new().check_and_update(record, now)
}

pub fn reset_streak(record: &StreakRecord, now: DateTime<Utc>) -> StreakRecord {
    StreakEngine::new().reset(record, now)
}

pub fn calculate_brain_rewiring(current_streak: u32) -> u8 {
    brain_rewiring_for_horizon(current_streak, BRAIN_REWIRING_HORIZON_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn record(current: u32, longest: u32, relapses: u32, last: DateTime<Utc>) -> StreakRecord {
        StreakRecord {
            user_id: "user-1".into(),
            current_streak: current,
            longest_streak: longest,
            start_date: last - Duration::days(i64::from(current)),
            last_check_date: last,
            relapses,
        }
    }

    #[test]
    fn initial_record_is_zeroed() {
        let now = at(2024, 6, 1, 9, 0);
        let r = create_initial_streak("u", now);
        assert_eq!(r.user_id, "u");
        assert_eq!(r.current_streak, 0);
        assert_eq!(r.longest_streak, 0);
        assert_eq!(r.relapses, 0);
        assert_eq!(r.start_date, now);
        assert_eq!(r.last_check_date, now);
    }

    #[test]
    fn same_day_is_identity() {
        let engine = StreakEngine::new();
        let r = record(4, 9, 1, at(2024, 6, 1, 0, 5));
        let out = engine.check_and_update_in(&r, at(2024, 6, 1, 23, 59), &Utc);
        assert_eq!(out, r);
    }

    #[test]
    fn next_day_increments_and_raises_longest() {
        let engine = StreakEngine::new();
        let r = record(5, 5, 0, at(2024, 6, 1, 22, 0));
        let now = at(2024, 6, 2, 7, 0);
        let out = engine.check_and_update_in(&r, now, &Utc);
        assert_eq!(out.current_streak, 6);
        assert_eq!(out.longest_streak, 6);
        assert_eq!(out.last_check_date, now);
        assert_eq!(out.start_date, r.start_date);
    }

    #[test]
    fn next_day_keeps_larger_longest() {
        let engine = StreakEngine::new();
        let r = record(2, 30, 4, at(2024, 6, 1, 12, 0));
        let out = engine.check_and_update_in(&r, at(2024, 6, 2, 12, 0), &Utc);
        assert_eq!(out.current_streak, 3);
        assert_eq!(out.longest_streak, 30);
    }

    #[test]
    fn missed_days_count_as_relapse() {
        let engine = StreakEngine::new();
        let r = record(10, 12, 2, at(2024, 6, 1, 12, 0));
        let now = at(2024, 6, 4, 8, 0);
        let out = engine.check_and_update_in(&r, now, &Utc);
        assert_eq!(out.current_streak, 0);
        assert_eq!(out.relapses, 3);
        assert_eq!(out.longest_streak, 12);
        assert_eq!(out.last_check_date, now);
        // start date is left alone on the implicit path
        assert_eq!(out.start_date, r.start_date);
    }

    #[test]
    fn missed_days_can_restart_the_clock() {
        let engine = StreakEngine::with_config(StreakConfig {
            reset_start_on_missed_day: true,
            ..Default::default()
        });
        let r = record(10, 12, 2, at(2024, 6, 1, 12, 0));
        let now = at(2024, 6, 4, 8, 0);
        let out = engine.check_and_update_in(&r, now, &Utc);
        assert_eq!(out.start_date, now);
    }

    #[test]
    fn clock_skew_leaves_record_unchanged() {
        let engine = StreakEngine::new();
        let r = record(3, 3, 0, at(2024, 6, 5, 12, 0));
        let now = at(2024, 6, 3, 12, 0);
        assert_eq!(
            engine.classify_in(&r, now, &Utc),
            DayTransition::ClockSkew { days: -2 }
        );
        assert_eq!(engine.check_and_update_in(&r, now, &Utc), r);
    }

    #[test]
    fn day_boundaries_follow_the_given_zone() {
        let engine = StreakEngine::new();
        let istanbul = FixedOffset::east_opt(3 * 3600).unwrap();
        // 23:30 local on June 1st, then 00:10 local on June 2nd
        let r = record(1, 1, 0, at(2024, 6, 1, 20, 30));
        let now = at(2024, 6, 1, 21, 10);
        assert_eq!(engine.classify_in(&r, now, &Utc), DayTransition::SameDay);
        assert_eq!(engine.classify_in(&r, now, &istanbul), DayTransition::NextDay);
    }

    #[test]
    fn explicit_reset_restarts_start_date() {
        let engine = StreakEngine::new();
        let now = at(2024, 6, 20, 18, 45);
        let mut r = record(10, 10, 0, now - Duration::days(1));
        r.start_date = now - Duration::days(10);
        let out = engine.reset(&r, now);
        assert_eq!(out.current_streak, 0);
        assert_eq!(out.start_date, now);
        assert_eq!(out.last_check_date, now);
        assert_eq!(out.relapses, 1);
        assert_eq!(out.longest_streak, 10);
        assert_eq!(out.user_id, r.user_id);
    }

    #[test]
    fn brain_rewiring_bounds() {
        assert_eq!(calculate_brain_rewiring(0), 0);
        assert_eq!(calculate_brain_rewiring(45), 50);
        assert_eq!(calculate_brain_rewiring(90), 100);
        assert_eq!(calculate_brain_rewiring(200), 100);
        // 1/90 = 1.11% -> 1, 89/90 = 98.9% -> 99
        assert_eq!(calculate_brain_rewiring(1), 1);
        assert_eq!(calculate_brain_rewiring(89), 99);
    }

    #[test]
    fn brain_rewiring_respects_custom_horizon() {
        let engine = StreakEngine::with_config(StreakConfig {
            brain_rewiring_horizon_days: 30,
            ..Default::default()
        });
        assert_eq!(engine.brain_rewiring(15), 50);
        assert_eq!(engine.brain_rewiring(30), 100);
    }

    #[test]
    fn transition_labels() {
        assert_eq!(DayTransition::from_elapsed_days(0), DayTransition::SameDay);
        assert_eq!(DayTransition::from_elapsed_days(1), DayTransition::NextDay);
        assert_eq!(
            DayTransition::from_elapsed_days(5),
            DayTransition::Missed { days: 5 }
        );
        assert_eq!(DayTransition::ClockSkew { days: -1 }.label(), "clock_skew");
    }
}
