//! Runtime configuration for processes embedding the core.
//!
//! # Responsibility
//! - Resolve database location and logging settings from the environment.
//! - Open the configured database.
//!
//! # Invariants
//! - Blank variables are treated as absent.
//! - Missing `GOAL_TRACKER_DB_PATH` selects an in-memory database.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::logging::{default_log_level, normalize_level, LoggingError};
use rusqlite::Connection;
use std::path::PathBuf;
use thiserror::Error;

pub const DB_PATH_VAR: &str = "GOAL_TRACKER_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "GOAL_TRACKER_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "GOAL_TRACKER_LOG_DIR";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("GOAL_TRACKER_LOG_LEVEL: {0}")]
    LogLevel(#[from] LoggingError),
}

/// Process configuration for the goal tracker core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// SQLite file path; `None` means in-memory.
    pub db_path: Option<PathBuf>,
    /// Normalized level (`trace|debug|info|warn|error`).
    pub log_level: String,
    /// Rolling log directory; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl TrackerConfig {
    /// Loads configuration from process environment, reading `.env` first
    /// when one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is the normal case outside local development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let log_level = match read(LOG_LEVEL_VAR) {
            Some(level) => normalize_level(&level)?,
            None => default_log_level(),
        };

        Ok(Self {
            db_path: read(DB_PATH_VAR).map(PathBuf::from),
            log_level: log_level.to_string(),
            log_dir: read(LOG_DIR_VAR).map(PathBuf::from),
        })
    }

    /// Opens the configured database with migrations applied.
    pub fn open_database(&self) -> DbResult<Connection> {
        match &self.db_path {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }
}
