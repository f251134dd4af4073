mod config;
pub mod database;
pub mod local;

pub use config::{Config, RemoteBackend, StreakSection, SyncSection, UserSection};
pub use database::Database;
pub use local::{LocalStore, MemoryLocalStore, SqliteLocalStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// Resolution order: `QUITTER_DATA_DIR` if set, otherwise
/// `~/.config/quitter[-dev]/` based on `QUITTER_ENV`
/// (set `QUITTER_ENV=dev` to use the development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("QUITTER_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("QUITTER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("quitter-dev")
            } else {
                base_dir.join("quitter")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
