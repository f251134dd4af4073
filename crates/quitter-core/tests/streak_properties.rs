//! Property-based tests for the streak engine.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use quitter_core::streak::{
    calculate_brain_rewiring, current_badge, ElapsedTimer, StreakEngine, StreakRecord,
};

#[derive(Debug, Clone)]
enum Step {
    /// Check after this many minutes.
    Check(i64),
    Reset(i64),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => (0i64..4 * 24 * 60).prop_map(Step::Check),
        1 => (0i64..3 * 24 * 60).prop_map(Step::Reset),
    ]
}

fn origin() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

proptest! {
    #[test]
    fn counters_stay_consistent_across_any_history(steps in prop::collection::vec(step(), 1..60)) {
        let engine = StreakEngine::new();
        let mut now = origin();
        let mut record = engine.create_initial("p", now);

        for step in steps {
            let before = record.clone();
            record = match step {
                Step::Check(minutes) => {
                    now += Duration::minutes(minutes);
                    engine.check_and_update_in(&record, now, &Utc)
                }
                Step::Reset(minutes) => {
                    now += Duration::minutes(minutes);
                    engine.reset(&record, now)
                }
            };

            prop_assert!(record.longest_streak >= record.current_streak);
            prop_assert!(record.longest_streak >= before.longest_streak);
            prop_assert!(record.relapses >= before.relapses);
            prop_assert!(record.relapses <= before.relapses + 1);
            prop_assert!(record.current_streak <= before.current_streak + 1);
            prop_assert!(record.last_check_date >= before.last_check_date);
        }
    }

    #[test]
    fn check_is_idempotent_at_the_same_instant(
        current in 0u32..500,
        extra in 0u32..50,
        relapses in 0u32..20,
        gap_minutes in 0i64..10 * 24 * 60,
    ) {
        let engine = StreakEngine::new();
        let last = origin();
        let record = StreakRecord {
            user_id: "p".into(),
            current_streak: current,
            longest_streak: current + extra,
            start_date: last - Duration::days(i64::from(current)),
            last_check_date: last,
            relapses,
        };
        let now = last + Duration::minutes(gap_minutes);
        let once = engine.check_and_update_in(&record, now, &Utc);
        let twice = engine.check_and_update_in(&once, now, &Utc);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn brain_rewiring_is_bounded_and_monotone(days in 0u32..1000) {
        let here = calculate_brain_rewiring(days);
        let next = calculate_brain_rewiring(days + 1);
        prop_assert!(here <= 100);
        prop_assert!(next >= here);
    }

    #[test]
    fn timer_decomposition_is_exact(ms in 0u64..10_000_000_000) {
        let t = ElapsedTimer::from_millis(ms);
        prop_assert!(t.hours < 24 && t.minutes < 60 && t.seconds < 60);
        prop_assert_eq!(t.total_seconds(), ms / 1000);
    }

    #[test]
    fn current_badge_never_exceeds_streak(days in 0u32..2000) {
        if let Some(badge) = current_badge(days) {
            prop_assert!(badge.required_days <= days);
        }
    }
}
