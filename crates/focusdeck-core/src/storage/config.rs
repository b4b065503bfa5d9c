//! TOML-based application configuration.
//!
//! Stores service settings: bind address, database file name, default
//! planned durations per session type, and reminder behavior.
//!
//! Configuration is stored at `~/.config/focusdeck/config.toml`.

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Default planned durations (minutes) per session type, applied when a
/// client starts a session without an explicit duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationsConfig {
    #[serde(default = "default_pomodoro_minutes")]
    pub pomodoro: u32,
    #[serde(default = "default_deep_work_minutes")]
    pub deep_work: u32,
    #[serde(default = "default_sprint_minutes")]
    pub sprint: u32,
}

impl DurationsConfig {
    /// Default planned minutes for a session type. Custom and flow
    /// sessions have no natural length; they fall back to the pomodoro
    /// default.
    pub fn for_type(&self, session_type: crate::session::SessionType) -> u32 {
        use crate::session::SessionType;
        match session_type {
            SessionType::Pomodoro => self.pomodoro,
            SessionType::DeepWork => self.deep_work,
            SessionType::Sprint => self.sprint,
            SessionType::Custom | SessionType::Flow => self.pomodoro,
        }
    }
}

/// Break reminder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/focusdeck/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub durations: DurationsConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
    /// Database file name within the data directory.
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

// Default functions
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    4280
}
fn default_pomodoro_minutes() -> u32 {
    25
}
fn default_deep_work_minutes() -> u32 {
    90
}
fn default_sprint_minutes() -> u32 {
    15
}
fn default_true() -> bool {
    true
}
fn default_database_file() -> String {
    "focusdeck.db".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DurationsConfig {
    fn default() -> Self {
        Self {
            pomodoro: default_pomodoro_minutes(),
            deep_work: default_deep_work_minutes(),
            sprint: default_sprint_minutes(),
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            durations: DurationsConfig::default(),
            reminders: RemindersConfig::default(),
            database_file: default_database_file(),
        }
    }
}

impl Config {
    fn path() -> Result<std::path::PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: std::path::PathBuf::from("~/.config/focusdeck"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing the defaults first if no file exists.
    ///
    /// # Errors
    /// Returns an error if an existing file cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
