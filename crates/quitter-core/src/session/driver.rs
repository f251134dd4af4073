//! Event-driven wrapper around [`StreakContext`].
//!
//! Auth changes and UI intents arrive as [`SessionEvent`]s on an mpsc
//! channel and are applied one at a time, so `load`, `reset_streak` and
//! `sync_with_remote` never interleave.

use tokio::sync::{broadcast, mpsc, watch};
use tracing::debug;

use super::context::{StreakContext, StreakSnapshot};
use crate::error::{CoreError, Result};
use crate::events::{SessionEvent, StreakEvent};
use crate::streak::ElapsedTimer;

const COMMAND_BUFFER: usize = 32;

/// Cloneable sender side of a running [`SessionDriver`].
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionEvent>,
    snapshot: watch::Receiver<StreakSnapshot>,
    timer: watch::Receiver<ElapsedTimer>,
    events: broadcast::Sender<StreakEvent>,
}

impl SessionHandle {
    pub async fn send(&self, event: SessionEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| CoreError::SessionClosed)
    }

    pub async fn sign_in(&self, user_id: impl Into<String>) -> Result<()> {
        self.send(SessionEvent::SignedIn {
            user_id: user_id.into(),
        })
        .await
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.send(SessionEvent::SignedOut).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.send(SessionEvent::Reset).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(SessionEvent::Shutdown).await
    }

    pub fn snapshot(&self) -> watch::Receiver<StreakSnapshot> {
        self.snapshot.clone()
    }

    pub fn timer(&self) -> watch::Receiver<ElapsedTimer> {
        self.timer.clone()
    }

    pub fn events(&self) -> broadcast::Receiver<StreakEvent> {
        self.events.subscribe()
    }
}

pub struct SessionDriver {
    context: StreakContext,
    rx: mpsc::Receiver<SessionEvent>,
}

impl SessionDriver {
    pub fn new(context: StreakContext) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = SessionHandle {
            tx,
            snapshot: context.subscribe(),
            timer: context.timer(),
            events: context.event_sender(),
        };
        (Self { context, rx }, handle)
    }

    /// Apply events until `Shutdown` or until every handle is dropped.
    ///
    /// Returns the context so callers can inspect the final state.
    pub async fn run(mut self) -> StreakContext {
        while let Some(event) = self.rx.recv().await {
            debug!(?event, "session event");
            match event {
                SessionEvent::SignedIn { user_id } => self.context.load(Some(&user_id)).await,
                SessionEvent::SignedOut => self.context.load(None).await,
                SessionEvent::Refresh => self.context.refresh().await,
                SessionEvent::Reset => self.context.reset_streak().await,
                SessionEvent::Sync => {
                    self.context.sync_with_remote().await;
                }
                SessionEvent::Shutdown => break,
            }
        }
        self.context.shutdown();
        self.context
    }

    /// Spawn [`run`](Self::run) onto the current runtime.
    pub fn spawn(context: StreakContext) -> (tokio::task::JoinHandle<StreakContext>, SessionHandle) {
        let (driver, handle) = Self::new(context);
        (tokio::spawn(driver.run()), handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use crate::storage::MemoryLocalStore;
    use crate::sync::MemoryRemoteStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn handle_errors_after_shutdown() {
        let ctx = StreakContext::new(
            Arc::new(MemoryLocalStore::new()),
            Arc::new(MemoryRemoteStore::new()),
        );
        let (task, handle) = SessionDriver::spawn(ctx);
        handle.sign_in("u").await.unwrap();
        handle.shutdown().await.unwrap();

        let ctx = task.await.unwrap();
        assert_eq!(ctx.state(), SessionState::Ready);
        assert!(!ctx.is_timer_running());
        assert!(matches!(
            handle.reset().await,
            Err(CoreError::SessionClosed)
        ));
    }
}
