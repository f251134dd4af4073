pub mod badges;
pub mod config;
pub mod streak;

use std::sync::Arc;

use quitter_core::storage::{Config, Database, SqliteLocalStore};
use quitter_core::sync::remote_from_config;
use quitter_core::StreakContext;
use tracing::debug;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Single-threaded runtime for one command invocation.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Resolve the active user from `--user`, then `user.id`.
pub fn resolve_user(flag: Option<&str>, config: &Config) -> Option<String> {
    flag.map(str::to_string)
        .or_else(|| config.user.id.clone())
        .filter(|id| !id.trim().is_empty())
}

/// Build a context over the on-disk store and the configured remote,
/// and load `user`'s streak into it.
pub async fn open_session(
    flag: Option<&str>,
) -> Result<(StreakContext, Config), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let user = resolve_user(flag, &config)
        .ok_or("no user selected: pass --user or run `quitter config set user.id <ID>`")?;

    let local = SqliteLocalStore::new(Database::open()?);
    let remote = remote_from_config(&config.sync)?;
    debug!(
        user_id = %user,
        backend = remote.name(),
        policy = ?config.sync.reconcile_policy,
        "opening streak session"
    );
    let mut ctx = StreakContext::from_config(&config, Arc::new(local), remote);
    ctx.load(Some(&user)).await;
    Ok((ctx, config))
}
