//! Achievement badges unlocked by streak length.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub id: u32,
    pub title: &'static str,
    pub tier: &'static str,
    pub icon: &'static str,
    pub required_days: u32,
    /// Locked tiers cannot be earned yet, whatever the streak.
    pub available: bool,
}

const fn badge(
    id: u32,
    title: &'static str,
    tier: &'static str,
    icon: &'static str,
    required_days: u32,
    available: bool,
) -> Badge {
    Badge {
        id,
        title,
        tier,
        icon,
        required_days,
        available,
    }
}

pub static BADGES: [Badge; 11] = [
    badge(1, "1 Day", "Bronze", "flame", 1, true),
    badge(2, "1 Week", "Silver", "shield-checkmark", 7, true),
    badge(3, "30 Days", "Cyan", "water", 30, true),
    badge(4, "Master", "Rainbow", "sparkles", 60, true),
    badge(5, "First Step", "Gold", "trophy", 1, true),
    badge(6, "Focus", "Purple", "brain", 14, true),
    badge(7, "Pure", "Bright", "diamond", 45, true),
    badge(8, "Loved", "Heart", "heart", 21, true),
    badge(9, "90 Days", "Locked", "lock-closed", 90, false),
    badge(10, "6 Months", "Locked", "lock-closed", 180, false),
    badge(11, "1 Year", "Locked", "lock-closed", 365, false),
];

impl Badge {
    pub fn is_earned(&self, streak_days: u32) -> bool {
        self.available && self.required_days <= streak_days
    }
}

/// Highest-threshold badge earned at `streak_days`.
///
/// Ties keep the earlier catalog entry. `None` means no badge yet.
pub fn current_badge(streak_days: u32) -> Option<&'static Badge> {
    BADGES
        .iter()
        .filter(|b| b.is_earned(streak_days))
        .fold(None, |best: Option<&'static Badge>, b| match best {
            Some(h) if b.required_days <= h.required_days => Some(h),
            _ => Some(b),
        })
}

/// Every earned badge, in catalog order.
pub fn earned_badges(streak_days: u32) -> Vec<&'static Badge> {
    BADGES.iter().filter(|b| b.is_earned(streak_days)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub available: usize,
    pub total: usize,
}

pub fn catalog_summary() -> CatalogSummary {
    CatalogSummary {
        available: BADGES.iter().filter(|b| b.available).count(),
        total: BADGES.len(),
    }
}
