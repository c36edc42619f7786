//! Process configuration from environment variables.
//!
//! A `.env` file in the working directory is loaded first when present.
//! `DATABASE_URL` selects the Postgres store; without it the in-memory store
//! is used.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use backoffice_inventory::ChangeHistoryPolicy;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `None` selects the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub bind_addr: SocketAddr,
    pub change_history: ChangeHistoryPolicy,
}

impl AppConfig {
    /// Read configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database = match get("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(
                    "DATABASE_MAX_CONNECTIONS",
                    get("DATABASE_MAX_CONNECTIONS"),
                    DEFAULT_MAX_CONNECTIONS,
                )?,
                connect_timeout: Duration::from_secs(parse_or(
                    "DATABASE_CONNECT_TIMEOUT_SECS",
                    get("DATABASE_CONNECT_TIMEOUT_SECS"),
                    DEFAULT_CONNECT_TIMEOUT_SECS,
                )?),
            }),
            None => None,
        };

        let bind_addr = parse_or(
            "BIND_ADDR",
            get("BIND_ADDR"),
            SocketAddr::from(([0, 0, 0, 0], 8080)),
        )?;

        let change_history = parse_or(
            "CHANGE_HISTORY",
            get("CHANGE_HISTORY"),
            ChangeHistoryPolicy::default(),
        )?;

        Ok(Self {
            database,
            bind_addr,
            change_history,
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
