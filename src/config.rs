//! Engine and database configuration.
//!
//! Both structs read from environment variables with defaults for everything except
//! the database URL.

use chrono::NaiveTime;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::scoring::{ScoringRules, DEFAULT_BEST_OF};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Tunables for bracket generation, progression and scoring
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Time of day every round starts on its scheduled date (UTC)
    pub round_start_time: NaiveTime,
    pub best_of: u32,
    pub scoring: ScoringRules,
    /// Attempts after a serialization failure before surfacing a transient error
    pub max_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            round_start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            best_of: DEFAULT_BEST_OF,
            scoring: ScoringRules::default(),
            max_retries: 3,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(None),
    }
}

impl EngineConfig {
    /// Create configuration from environment variables
    ///
    /// - `BRACKET_ROUND_START`: round start time as `HH:MM` (default: 08:00)
    /// - `BRACKET_BEST_OF`: games per match (default: 3)
    /// - `BRACKET_MAX_RETRIES`: retries on serialization failure (default: 3)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let round_start_time = match env::var("BRACKET_ROUND_START") {
            Ok(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| {
                ConfigError::Invalid {
                    name: "BRACKET_ROUND_START",
                    value: raw,
                }
            })?,
            Err(_) => defaults.round_start_time,
        };

        let best_of: u32 = parse_var("BRACKET_BEST_OF")?.unwrap_or(defaults.best_of);
        if best_of == 0 {
            return Err(ConfigError::Invalid {
                name: "BRACKET_BEST_OF",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            round_start_time,
            best_of,
            scoring: defaults.scoring,
            max_retries: parse_var("BRACKET_MAX_RETRIES")?.unwrap_or(defaults.max_retries),
        })
    }
}

/// Database configuration for the PostgreSQL repositories
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

impl DatabaseConfig {
    /// - `DATABASE_URL`: PostgreSQL connection string (required)
    /// - `DB_MAX_CONNECTIONS`: pool size (default: 10)
    /// - `DB_CONNECTION_TIMEOUT`: seconds (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            max_connections: parse_var("DB_MAX_CONNECTIONS")?.unwrap_or(10),
            connection_timeout_secs: parse_var("DB_CONNECTION_TIMEOUT")?.unwrap_or(10),
        })
    }

    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.connection_timeout_secs))
            .connect(&self.database_url)
            .await
    }
}
