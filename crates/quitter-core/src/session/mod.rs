//! Streak session: orchestrator, timer task, and event driver.

mod context;
mod driver;
mod ticker;

pub use context::{SessionState, StreakContext, StreakSnapshot};
pub use driver::{SessionDriver, SessionHandle};
