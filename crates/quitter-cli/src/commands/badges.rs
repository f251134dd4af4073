use serde::Serialize;

use quitter_core::storage::Config;
use quitter_core::streak::{catalog_summary, current_badge, Badge, BADGES};

use super::{open_session, resolve_user, runtime, CmdResult};

#[derive(Serialize)]
struct BadgeRow {
    #[serde(flatten)]
    badge: &'static Badge,
    earned: bool,
    current: bool,
}

/// Catalog view for `streak_days`.
fn rows(streak_days: u32) -> Vec<BadgeRow> {
    let current = current_badge(streak_days).map(|b| b.id);
    BADGES
        .iter()
        .map(|badge| BadgeRow {
            badge,
            earned: badge.is_earned(streak_days),
            current: current == Some(badge.id),
        })
        .collect()
}

pub fn run(user: Option<&str>, json: bool) -> CmdResult {
    // Without a user the catalog is still shown, with nothing earned.
    let config = Config::load()?;
    let streak_days = match resolve_user(user, &config) {
        Some(_) => runtime()?.block_on(current_streak(user))?,
        None => 0,
    };

    let rows = rows(streak_days);
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let summary = catalog_summary();
    println!(
        "Streak: {streak_days} days ({} of {} badges available)",
        summary.available, summary.total
    );
    for row in &rows {
        let marker = if row.current {
            "*"
        } else if row.earned {
            "+"
        } else if !row.badge.available {
            "x"
        } else {
            " "
        };
        println!(
            "[{marker}] {:<10} {:<8} {:>4} days",
            row.badge.title, row.badge.tier, row.badge.required_days
        );
    }
    Ok(())
}

async fn current_streak(user: Option<&str>) -> Result<u32, Box<dyn std::error::Error>> {
    let (mut ctx, _) = open_session(user).await?;
    let days = ctx.record().map(|r| r.current_streak).unwrap_or(0);
    ctx.shutdown();
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_single_current_badge() {
        let rows = rows(30);
        let current: Vec<_> = rows.iter().filter(|r| r.current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].badge.title, "30 Days");
        assert!(rows.iter().filter(|r| !r.badge.available).all(|r| !r.earned));
    }
}
