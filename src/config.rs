use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::db::Database;

/// Which storage adapter backs the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Backend {
    /// SQLite database file (persistent)
    #[default]
    Sqlite,
    /// Process-local collections, seeded with sample data (nothing persists)
    Memory,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "file" => Ok(Backend::Sqlite),
            "memory" | "mem" => Ok(Backend::Memory),
            other => Err(ConfigError::InvalidBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: Backend,
    pub db_path: PathBuf,
    pub log_level: String,
    pub seed: bool,
}

impl AppConfig {
    /// Read `.env` (if any) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = match lookup("JOBPORTAL_BACKEND") {
            Some(value) => value.parse()?,
            None => Backend::default(),
        };

        let db_path = lookup("JOBPORTAL_DB")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(Database::default_path);

        let log_level = lookup("JOBPORTAL_LOG").unwrap_or_else(|| "warn".to_string());

        let seed = match lookup("JOBPORTAL_SEED") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidSeedFlag(value))?,
            None => true,
        };

        Ok(Self {
            backend,
            db_path,
            log_level,
            seed,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JOBPORTAL_BACKEND must be 'sqlite' or 'memory', got '{0}'")]
    InvalidBackend(String),

    #[error("JOBPORTAL_SEED must be a boolean, got '{0}'")]
    InvalidSeedFlag(String),
}
