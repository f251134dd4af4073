//! # Quitter Core Library
//!
//! Core logic for the Quitter streak tracker. Every operation is available
//! through the standalone `quitter` CLI, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Streak Engine**: Pure calendar-day rules that advance, break or reset
//!   a streak, plus the elapsed timer and brain-rewiring percentage
//! - **Storage**: SQLite key-value store for the device-local record and
//!   TOML-based configuration
//! - **Sync**: Per-user remote documents (Firestore REST or in-memory) and
//!   the reconciliation policy between the two stores
//! - **Session**: The orchestrator that loads, reconciles and publishes the
//!   active record and drives a per-second timer
//!
//! ## Key Components
//!
//! - [`StreakEngine`]: Day transition rules
//! - [`StreakContext`]: Session-scoped orchestrator
//! - [`SessionDriver`]: Event loop feeding auth and UI intents to the context
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod streak;
pub mod sync;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, StoreError};
pub use events::{RecordSource, SessionEvent, StreakEvent};
pub use session::{SessionDriver, SessionHandle, SessionState, StreakContext, StreakSnapshot};
pub use storage::{Config, Database, LocalStore, MemoryLocalStore, SqliteLocalStore};
pub use streak::{
    compute_elapsed_timer, current_badge, Badge, DayTransition, ElapsedTimer, StreakConfig,
    StreakEngine, StreakRecord,
};
pub use sync::{
    remote_from_config, DisabledRemoteStore, FirestoreRemoteStore, MemoryRemoteStore,
    ReconcilePolicy, RemoteStore,
};
