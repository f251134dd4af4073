//! Recurring elapsed-timer task.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::clock::Clock;
use crate::streak::{compute_elapsed_timer, ElapsedTimer};

/// A running per-second timer bound to one streak start instant.
///
/// Dropping the handle stops the task.
pub(crate) struct TimerTask {
    start_date: DateTime<Utc>,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl TimerTask {
    pub(crate) fn spawn(
        start_date: DateTime<Utc>,
        period: Duration,
        clock: Arc<dyn Clock>,
        output: Arc<watch::Sender<ElapsedTimer>>,
    ) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        output.send_replace(compute_elapsed_timer(start_date, clock.now()));
                    }
                }
            }
            tracing::trace!(%start_date, "streak timer stopped");
        });
        Self {
            start_date,
            shutdown,
            handle,
        }
    }

    pub(crate) fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    pub(crate) fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for TimerTask {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        self.handle.abort();
    }
}
