mod badges;
mod engine;
mod record;
mod timer;

pub use badges::{
    catalog_summary, current_badge, earned_badges, Badge, CatalogSummary, BADGES,
};
pub use engine::{
    calculate_brain_rewiring, check_and_update_streak, create_initial_streak,
    elapsed_calendar_days, reset_streak, DayTransition, StreakConfig, StreakEngine,
    BRAIN_REWIRING_HORIZON_DAYS,
};
pub use record::{StreakRecord, STREAK_COLLECTION, STREAK_KEY};
pub use timer::{compute_elapsed_timer, ElapsedTimer};
