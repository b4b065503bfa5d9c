mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, DurationsConfig};
pub use database::{Database, SessionTotals};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/focusdeck[-dev]/` based on FOCUSDECK_ENV.
///
/// Set FOCUSDECK_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSDECK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusdeck-dev")
    } else {
        base_dir.join("focusdeck")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
