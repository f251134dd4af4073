use chrono::{DateTime, Utc};
use serde::Serialize;

use quitter_core::storage::RemoteBackend;
use quitter_core::streak::{current_badge, Badge, ElapsedTimer};
use quitter_core::StreakContext;

use super::{open_session, runtime, CmdResult};

#[derive(Serialize)]
struct StatusView<'a> {
    user_id: &'a str,
    current_streak: u32,
    longest_streak: u32,
    relapses: u32,
    brain_rewiring: u8,
    start_date: DateTime<Utc>,
    last_check_date: DateTime<Utc>,
    elapsed: ElapsedTimer,
    badge: Option<&'static Badge>,
}

fn status_view(ctx: &StreakContext) -> Result<StatusView<'_>, Box<dyn std::error::Error>> {
    let record = ctx.record().ok_or("streak could not be loaded")?;
    Ok(StatusView {
        user_id: &record.user_id,
        current_streak: record.current_streak,
        longest_streak: record.longest_streak,
        relapses: record.relapses,
        brain_rewiring: ctx.brain_rewiring(),
        start_date: record.start_date,
        last_check_date: record.last_check_date,
        elapsed: ctx.current_timer(),
        badge: current_badge(record.current_streak),
    })
}

pub fn status(user: Option<&str>, json: bool) -> CmdResult {
    runtime()?.block_on(status_session(user, json))
}

async fn status_session(user: Option<&str>, json: bool) -> CmdResult {
    let (mut ctx, _) = open_session(user).await?;
    let view = status_view(&ctx)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("User:           {}", view.user_id);
        println!("Current streak: {} days", view.current_streak);
        println!("Longest streak: {} days", view.longest_streak);
        println!("Relapses:       {}", view.relapses);
        println!("Brain rewiring: {}%", view.brain_rewiring);
        println!("Clean for:      {}", view.elapsed);
        match view.badge {
            Some(badge) => println!("Badge:          {} {}", badge.icon, badge.title),
            None => println!("Badge:          none yet"),
        }
    }
    ctx.shutdown();
    Ok(())
}

pub fn check(user: Option<&str>) -> CmdResult {
    runtime()?.block_on(check_session(user))
}

async fn check_session(user: Option<&str>) -> CmdResult {
    let (mut ctx, _) = open_session(user).await?;
    let record = ctx.record().ok_or("streak could not be loaded")?;
    println!("{}", serde_json::to_string_pretty(record)?);
    ctx.shutdown();
    Ok(())
}

pub fn reset(user: Option<&str>, yes: bool) -> CmdResult {
    if !yes {
        return Err("refusing to reset the streak without --yes".into());
    }
    runtime()?.block_on(reset_session(user))
}

async fn reset_session(user: Option<&str>) -> CmdResult {
    let (mut ctx, _) = open_session(user).await?;
    ctx.reset_streak().await;
    let record = ctx.record().ok_or("streak could not be loaded")?;
    println!("{}", serde_json::to_string_pretty(record)?);
    ctx.shutdown();
    Ok(())
}

pub fn sync(user: Option<&str>) -> CmdResult {
    runtime()?.block_on(sync_session(user))
}

async fn sync_session(user: Option<&str>) -> CmdResult {
    let (mut ctx, config) = open_session(user).await?;
    let pushed = ctx.sync_with_remote().await;
    ctx.shutdown();
    if config.sync.backend == RemoteBackend::None {
        println!("remote sync is disabled (set sync.backend to enable it)");
        return Ok(());
    }
    if !pushed {
        return Err("remote sync failed; rerun with --verbose for details".into());
    }
    println!("synced");
    Ok(())
}

pub fn watch(user: Option<&str>, seconds: u32) -> CmdResult {
    runtime()?.block_on(watch_session(user, seconds))
}

async fn watch_session(user: Option<&str>, seconds: u32) -> CmdResult {
    let (mut ctx, _) = open_session(user).await?;
    let mut timer = ctx.timer();
    println!("{}", *timer.borrow_and_update());
    for _ in 0..seconds {
        timer.changed().await?;
        println!("{}", *timer.borrow_and_update());
    }
    ctx.shutdown();
    Ok(())
}
