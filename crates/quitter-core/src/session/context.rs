//! Session-scoped streak orchestrator.
//!
//! ## States
//!
//! ```text
//! Uninitialized -> Loading -> Ready -> Loading (user change / refresh) -> Ready ...
//!                                   \-> SignedOut
//! ```
//!
//! The context owns the active [`StreakRecord`]. Consumers read published
//! snapshots through `watch` receivers and route every mutation through the
//! async operations below. Store failures are logged and reported as
//! [`StreakEvent::StoreFailed`]; they never escape an operation.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::ticker::TimerTask;
use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;
use crate::events::{RecordSource, StreakEvent};
use crate::storage::{Config, LocalStore};
use crate::streak::{
    compute_elapsed_timer, DayTransition, ElapsedTimer, StreakEngine, StreakRecord,
    STREAK_COLLECTION, STREAK_KEY,
};
use crate::sync::{resolve_conflict, MergeDecision, ReconcilePolicy, RemoteStore};

const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Loading,
    Ready,
    SignedOut,
}

/// Read-only view published to consumers after every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakSnapshot {
    pub state: SessionState,
    pub user_id: Option<String>,
    pub record: Option<StreakRecord>,
    pub brain_rewiring: u8,
}

impl StreakSnapshot {
    fn initial() -> Self {
        Self {
            state: SessionState::Uninitialized,
            user_id: None,
            record: None,
            brain_rewiring: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.state,
            SessionState::Uninitialized | SessionState::Loading
        )
    }
}

pub struct StreakContext {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    clock: Arc<dyn Clock>,
    engine: StreakEngine,
    policy: ReconcilePolicy,
    tick: Duration,

    state: SessionState,
    user_id: Option<String>,
    record: Option<StreakRecord>,
    timer: Option<TimerTask>,

    snapshot_tx: watch::Sender<StreakSnapshot>,
    timer_tx: Arc<watch::Sender<ElapsedTimer>>,
    events_tx: broadcast::Sender<StreakEvent>,
}

impl StreakContext {
    pub fn new(local: Arc<dyn LocalStore>, remote: Arc<dyn RemoteStore>) -> Self {
        let (snapshot_tx, _) = watch::channel(StreakSnapshot::initial());
        let (timer_tx, _) = watch::channel(ElapsedTimer::zero());
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            local,
            remote,
            clock: Arc::new(SystemClock),
            engine: StreakEngine::new(),
            policy: ReconcilePolicy::default(),
            tick: Duration::from_secs(1),
            state: SessionState::Uninitialized,
            user_id: None,
            record: None,
            timer: None,
            snapshot_tx,
            timer_tx: Arc::new(timer_tx),
            events_tx,
        }
    }

    /// Wire stores with the engine, policy and tick from `config`.
    pub fn from_config(
        config: &Config,
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
    ) -> Self {
        Self::new(local, remote)
            .with_engine(StreakEngine::with_config(config.streak.engine_config()))
            .with_policy(config.sync.reconcile_policy)
            .with_tick_interval(config.streak.tick_interval())
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_engine(mut self, engine: StreakEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_tick_interval(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn subscribe(&self) -> watch::Receiver<StreakSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn timer(&self) -> watch::Receiver<ElapsedTimer> {
        self.timer_tx.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<StreakEvent> {
        self.events_tx.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<StreakEvent> {
        self.events_tx.clone()
    }

    pub fn snapshot(&self) -> StreakSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn record(&self) -> Option<&StreakRecord> {
        self.record.as_ref()
    }

    pub fn current_timer(&self) -> ElapsedTimer {
        *self.timer_tx.borrow()
    }

    pub fn brain_rewiring(&self) -> u8 {
        self.record
            .as_ref()
            .map(|r| self.engine.brain_rewiring(r.current_streak))
            .unwrap_or(0)
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.as_ref().is_some_and(TimerTask::is_running)
    }

    pub fn engine(&self) -> &StreakEngine {
        &self.engine
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Load, reconcile and publish the streak of `user_id`.
    ///
    /// `None` signs the session out without touching either store.
    pub async fn load(&mut self, user_id: Option<&str>) {
        let Some(user_id) = user_id else {
            self.sign_out();
            return;
        };

        if self.user_id.as_deref() != Some(user_id) {
            // Never show one user's record or timer while another loads.
            self.stop_timer();
            self.record = None;
            self.timer_tx.send_replace(ElapsedTimer::zero());
        }
        self.user_id = Some(user_id.to_string());
        self.set_state(SessionState::Loading);

        let Some((record, source)) = self.obtain_record(user_id).await else {
            warn!(user_id, "streak unavailable: every store read failed");
            self.set_state(SessionState::Ready);
            return;
        };

        let now = self.clock.now();
        let transition = self.engine.classify(&record, now);
        let updated = self.engine.apply(&record, transition, now);
        if updated != record {
            debug!(user_id, transition = transition.label(), "streak reconciled");
            self.persist(&updated).await;
        }
        if let DayTransition::ClockSkew { days } = transition {
            warn!(user_id, days, "last check lies in the future; streak left unchanged");
        }

        info!(
            user_id,
            current_streak = updated.current_streak,
            source = ?source,
            "streak loaded"
        );
        self.emit(StreakEvent::StreakLoaded {
            user_id: user_id.to_string(),
            source,
            transition,
            record: updated.clone(),
            at: now,
        });
        self.publish_record(updated);
    }

    /// Re-run `load` for the current user.
    pub async fn refresh(&mut self) {
        let user_id = self.user_id.clone();
        self.load(user_id.as_deref()).await;
    }

    /// Explicit relapse. No-op without an active user and record.
    ///
    /// The reset record is published before it is written to the stores.
    pub async fn reset_streak(&mut self) {
        let (Some(user_id), Some(record)) = (self.user_id.clone(), self.record.as_ref()) else {
            debug!("reset ignored: no active streak");
            return;
        };

        let now = self.clock.now();
        let updated = self.engine.reset(record, now);
        info!(user_id, relapses = updated.relapses, "streak reset");
        self.publish_record(updated.clone());
        self.persist(&updated).await;
        self.emit(StreakEvent::StreakReset {
            user_id,
            relapses: updated.relapses,
            at: now,
        });
    }

    /// Best-effort push of the in-memory record to the remote store.
    ///
    /// Returns whether the write went through; failures are only logged.
    /// Always `false` when the remote store is disabled.
    pub async fn sync_with_remote(&mut self) -> bool {
        let (Some(user_id), Some(record)) = (self.user_id.clone(), self.record.clone()) else {
            debug!("sync skipped: no active streak");
            return false;
        };
        if !self.remote.enabled() {
            debug!(user_id, "sync skipped: remote store disabled");
            return false;
        }

        match self.write_remote(&user_id, &record).await {
            Ok(()) => {
                self.emit(StreakEvent::StreakSynced {
                    user_id,
                    at: self.clock.now(),
                });
                true
            }
            Err(err) => {
                self.report_failure(self.remote.name(), "sync", &err);
                false
            }
        }
    }

    /// Stop the timer task. The published snapshot is left as is.
    pub fn shutdown(&mut self) {
        self.stop_timer();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn sign_out(&mut self) {
        self.stop_timer();
        let was_signed_in = self.user_id.take().is_some();
        self.record = None;
        self.timer_tx.send_replace(ElapsedTimer::zero());
        self.set_state(SessionState::SignedOut);
        if was_signed_in {
            info!("streak session signed out");
            self.emit(StreakEvent::SignedOut {
                at: self.clock.now(),
            });
        }
    }

    /// `None` only when every read failed and nothing is held in memory.
    async fn obtain_record(&mut self, user_id: &str) -> Option<(StreakRecord, RecordSource)> {
        let local = self.read_local(user_id).await;

        let remote = match (&local, self.policy) {
            (Ok(Some(_)), ReconcilePolicy::LocalFirst) => Ok(None),
            _ => self.read_remote(user_id).await,
        };

        let found = match (local, remote) {
            (Ok(Some(local)), Ok(Some(remote))) => match resolve_conflict(&local, &remote) {
                MergeDecision::UseLocal => {
                    if local != remote {
                        self.write_remote_logged(user_id, &local).await;
                    }
                    (local, RecordSource::Local)
                }
                MergeDecision::UseRemote => {
                    self.write_local_logged(&remote).await;
                    (remote, RecordSource::Remote)
                }
            },
            (Ok(Some(local)), _) => (local, RecordSource::Local),
            (Err(_), Ok(Some(remote))) | (Ok(None), Ok(Some(remote))) => {
                (remote, RecordSource::Remote)
            }
            (local, remote) => {
                // Failed reads say nothing about what the stores hold, so the
                // live record outranks a fresh one.
                let held = self.record.clone().filter(|r| r.user_id == user_id);
                let (record, source) = match held {
                    Some(record) => {
                        debug!(user_id, "no stored streak readable; keeping in-memory record");
                        (record, RecordSource::Session)
                    }
                    None if local.is_err() && remote.is_err() => return None,
                    None => {
                        info!(user_id, "creating initial streak");
                        let record = self.engine.create_initial(user_id, self.clock.now());
                        (record, RecordSource::Created)
                    }
                };
                // Only seed the stores that answered "empty".
                if local.is_ok() {
                    self.write_local_logged(&record).await;
                }
                if remote.is_ok() {
                    self.write_remote_logged(user_id, &record).await;
                }
                (record, source)
            }
        };
        Some(found)
    }

    /// Local record for `user_id`; a record owned by someone else reads as empty.
    async fn read_local(&mut self, user_id: &str) -> Result<Option<StreakRecord>, StoreError> {
        let value = match self.local.get(STREAK_KEY).await {
            Ok(v) => v,
            Err(err) => {
                self.report_failure("local", "read", &err);
                return Err(err);
            }
        };
        let Some(value) = value else {
            return Ok(None);
        };
        match StreakRecord::from_json(value) {
            Ok(record) if record.user_id == user_id => Ok(Some(record)),
            Ok(record) => {
                debug!(
                    user_id,
                    stored_user = %record.user_id,
                    "local streak belongs to another user; ignoring"
                );
                Ok(None)
            }
            Err(err) => {
                let err = StoreError::from(err);
                self.report_failure("local", "decode", &err);
                Ok(None)
            }
        }
    }

    async fn read_remote(&mut self, user_id: &str) -> Result<Option<StreakRecord>, StoreError> {
        let value = match self.remote.get_document(STREAK_COLLECTION, user_id).await {
            Ok(v) => v,
            Err(err) => {
                self.report_failure(self.remote.name(), "read", &err);
                return Err(err);
            }
        };
        let Some(value) = value else {
            return Ok(None);
        };
        match StreakRecord::from_json(value) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                let err = StoreError::from(err);
                self.report_failure(self.remote.name(), "decode", &err);
                Ok(None)
            }
        }
    }

    /// Local first, then remote.
    async fn persist(&mut self, record: &StreakRecord) {
        self.write_local_logged(record).await;
        if let Some(user_id) = self.user_id.clone() {
            self.write_remote_logged(&user_id, record).await;
        }
    }

    async fn write_local_logged(&mut self, record: &StreakRecord) {
        let result = match record.to_json() {
            Ok(json) => self.local.set(STREAK_KEY, &json).await,
            Err(err) => Err(err.into()),
        };
        if let Err(err) = result {
            self.report_failure("local", "write", &err);
        }
    }

    async fn write_remote_logged(&mut self, user_id: &str, record: &StreakRecord) {
        if let Err(err) = self.write_remote(user_id, record).await {
            self.report_failure(self.remote.name(), "write", &err);
        }
    }

    async fn write_remote(&self, user_id: &str, record: &StreakRecord) -> Result<(), StoreError> {
        let json = record.to_json()?;
        self.remote
            .set_document(STREAK_COLLECTION, user_id, &json, true)
            .await
    }

    fn publish_record(&mut self, record: StreakRecord) {
        let start_changed = self.timer.as_ref().map(TimerTask::start_date) != Some(record.start_date);
        if start_changed {
            self.stop_timer();
            self.timer = Some(TimerTask::spawn(
                record.start_date,
                self.tick,
                self.clock.clone(),
                self.timer_tx.clone(),
            ));
        }
        self.timer_tx
            .send_replace(compute_elapsed_timer(record.start_date, self.clock.now()));
        self.record = Some(record);
        self.set_state(SessionState::Ready);
    }

    fn stop_timer(&mut self) {
        // Dropping the task signals shutdown and aborts it.
        self.timer.take();
    }

    fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.snapshot_tx.send_replace(StreakSnapshot {
            state,
            user_id: self.user_id.clone(),
            record: self.record.clone(),
            brain_rewiring: self.brain_rewiring(),
        });
    }

    fn report_failure(&self, store: &str, operation: &str, err: &StoreError) {
        warn!(store, operation, error = %err, "streak store operation failed");
        self.emit(StreakEvent::StoreFailed {
            store: store.to_string(),
            operation: operation.to_string(),
            message: err.to_string(),
            at: self.clock.now(),
        });
    }

    fn emit(&self, event: StreakEvent) {
        // No subscribers is fine.
        let _ = self.events_tx.send(event);
    }
}

impl Drop for StreakContext {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryLocalStore;
    use crate::sync::MemoryRemoteStore;
    use chrono::{TimeZone, Utc};

    fn context() -> (StreakContext, Arc<MemoryLocalStore>, Arc<MemoryRemoteStore>) {
        let local = Arc::new(MemoryLocalStore::new());
        let remote = Arc::new(MemoryRemoteStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap(),
        ));
        let ctx = StreakContext::new(local.clone(), remote.clone()).with_clock(clock);
        (ctx, local, remote)
    }

    #[tokio::test]
    async fn starts_uninitialized() {
        let (ctx, _, _) = context();
        let snap = ctx.snapshot();
        assert_eq!(snap.state, SessionState::Uninitialized);
        assert!(snap.is_loading());
        assert!(!ctx.is_timer_running());
    }

    #[tokio::test]
    async fn load_without_user_signs_out_and_skips_stores() {
        let (mut ctx, local, _) = context();
        ctx.load(None).await;
        assert_eq!(ctx.state(), SessionState::SignedOut);
        assert!(ctx.record().is_none());
        assert!(local.peek(STREAK_KEY).is_none());
        assert!(!ctx.is_timer_running());
    }

    #[tokio::test]
    async fn reset_and_sync_without_record_are_noops() {
        let (mut ctx, local, remote) = context();
        ctx.reset_streak().await;
        assert!(!ctx.sync_with_remote().await);
        assert!(local.peek(STREAK_KEY).is_none());
        assert!(remote.peek(STREAK_COLLECTION, "u").is_none());
    }

    #[tokio::test]
    async fn foreign_local_record_is_ignored() {
        let (mut ctx, local, _) = context();
        let other = crate::streak::create_initial_streak(
            "someone-else",
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
        );
        local.insert(STREAK_KEY, other.to_json().unwrap());

        ctx.load(Some("me")).await;
        let record = ctx.record().unwrap();
        assert_eq!(record.user_id, "me");
        assert_eq!(
            StreakRecord::from_json(local.peek(STREAK_KEY).unwrap())
                .unwrap()
                .user_id,
            "me"
        );
    }

    #[tokio::test]
    async fn sign_out_stops_timer() {
        let (mut ctx, _, _) = context();
        ctx.load(Some("u")).await;
        assert!(ctx.is_timer_running());
        ctx.load(None).await;
        assert!(!ctx.is_timer_running());
        assert_eq!(ctx.snapshot().state, SessionState::SignedOut);
        assert_eq!(ctx.current_timer(), ElapsedTimer::zero());
    }
}
