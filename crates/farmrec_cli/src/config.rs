//! Runtime configuration for the CLI.
//!
//! Each setting resolves as command-line flag, then environment variable,
//! then built-in default. Blank values count as unset.

use farmrec_core::{default_log_level, LogLevel, LoggingError};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "FARMREC_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "FARMREC_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "FARMREC_LOG_DIR";
const DEFAULT_DB_FILE_NAME: &str = "farmrec.sqlite3";

/// Values given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFlags {
    pub db: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: LogLevel,
    /// File logging is off when unset.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Resolves against the process environment.
    pub fn resolve(flags: ConfigFlags) -> Result<Self, LoggingError> {
        Self::resolve_with(flags, |key| std::env::var(key).ok())
    }

    /// Resolves with an explicit environment lookup.
    pub fn resolve_with(
        flags: ConfigFlags,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, LoggingError> {
        let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let db_path = flags
            .db
            .or_else(|| lookup(DB_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
        let log_level = match flags.log_level.or_else(|| lookup(LOG_LEVEL_ENV)) {
            Some(raw) => raw.parse()?,
            None => default_log_level(),
        };
        let log_dir = flags
            .log_dir
            .or_else(|| lookup(LOG_DIR_ENV).map(PathBuf::from));

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}
