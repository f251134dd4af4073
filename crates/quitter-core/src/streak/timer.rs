use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Wall-clock time since a streak started, split into display units.
///
/// Each field is the remainder left after the larger units are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElapsedTimer {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl ElapsedTimer {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_millis(ms: u64) -> Self {
        Self {
            days: ms / MS_PER_DAY,
            hours: (ms % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (ms % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (ms % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }
}

impl std::fmt::Display for ElapsedTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Elapsed time between `start_date` and `now`; a start in the future reads as zero.
pub fn compute_elapsed_timer(start_date: DateTime<Utc>, now: DateTime<Utc>) -> ElapsedTimer {
    let diff_ms = now
        .signed_duration_since(start_date)
        .num_milliseconds()
        .max(0) as u64;
    ElapsedTimer::from_millis(diff_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn decomposes_into_remainders() {
        let now = Utc.with_ymd_and_hms(2024, 2, 2, 2, 2, 2).unwrap();
        let start = now - Duration::milliseconds(90_061_000);
        assert_eq!(
            compute_elapsed_timer(start, now),
            ElapsedTimer {
                days: 1,
                hours: 1,
                minutes: 1,
                seconds: 1
            }
        );
    }

    #[test]
    fn sub_second_remainder_is_dropped() {
        let now = Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap();
        let start = now - Duration::milliseconds(59_999);
        let t = compute_elapsed_timer(start, now);
        assert_eq!(t.minutes, 0);
        assert_eq!(t.seconds, 59);
    }

    #[test]
    fn future_start_clamps_to_zero() {
        let now = Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap();
        let start = now + Duration::hours(3);
        assert_eq!(compute_elapsed_timer(start, now), ElapsedTimer::zero());
    }

    #[test]
    fn display_pads_sub_day_units() {
        let t = ElapsedTimer {
            days: 12,
            hours: 3,
            minutes: 4,
            seconds: 5,
        };
        assert_eq!(t.to_string(), "12d 03h 04m 05s");
        assert_eq!(t.total_seconds(), 12 * 86_400 + 3 * 3_600 + 4 * 60 + 5);
    }
}
