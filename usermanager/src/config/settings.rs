use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use usermanager_repository::{CacheSource, DEFAULT_CACHE_TTL};
use usermanager_shared::types::DEFAULT_HASH_COST;
use usermanager_usecase::DEFAULT_VOTE_INTERVAL;

use crate::errors::AppError;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Where users and votes are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { url: String, max_connections: u32 },
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application settings read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub store: StoreBackend,
    pub cache: CacheSource,
    pub cache_ttl: Duration,
    pub vote_interval: Duration,
    pub hash_cost: u32,
    pub http_addr: SocketAddr,
    pub log_format: LogFormat,
}

impl Settings {
    /// Reads the settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` naming the variable when a value is missing
    /// or cannot be parsed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the settings through `lookup`, which returns the raw value of a
    /// variable when it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let store = match lookup("STORE_BACKEND").as_deref().unwrap_or("postgres") {
            "postgres" => StoreBackend::Postgres {
                url: required(&lookup, "DATABASE_URL")?,
                max_connections: parsed(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(AppError::config(format!(
                    "STORE_BACKEND must be one of: postgres, memory (got {other:?})"
                )));
            }
        };

        let cache = match lookup("CACHE_BACKEND").as_deref().unwrap_or("redis") {
            "redis" => CacheSource::redis(required(&lookup, "REDIS_URL")?),
            "memory" => CacheSource::memory(),
            other => {
                return Err(AppError::config(format!(
                    "CACHE_BACKEND must be one of: redis, memory (got {other:?})"
                )));
            }
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().unwrap_or("pretty") {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(AppError::config(format!(
                    "LOG_FORMAT must be one of: pretty, json (got {other:?})"
                )));
            }
        };

        Ok(Self {
            store,
            cache,
            cache_ttl: Duration::from_secs(parsed(
                &lookup,
                "CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL.as_secs(),
            )?),
            vote_interval: Duration::from_secs(parsed(
                &lookup,
                "VOTE_INTERVAL_SECS",
                DEFAULT_VOTE_INTERVAL.as_secs(),
            )?),
            hash_cost: parsed(&lookup, "BCRYPT_COST", DEFAULT_HASH_COST)?,
            http_addr: parsed(&lookup, "HTTP_ADDR", default_http_addr())?,
            log_format,
        })
    }

    /// Settings backed entirely by in-process storage, for development and tests.
    pub fn in_memory() -> Self {
        Self {
            store: StoreBackend::Memory,
            cache: CacheSource::memory(),
            cache_ttl: DEFAULT_CACHE_TTL,
            vote_interval: DEFAULT_VOTE_INTERVAL,
            hash_cost: DEFAULT_HASH_COST,
            http_addr: default_http_addr(),
            log_format: LogFormat::Pretty,
        }
    }
}

fn default_http_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, AppError> {
    lookup(name).ok_or_else(|| AppError::config(format!("{name} must be set")))
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::config(format!("{name} is invalid ({raw:?}): {e}"))),
        None => Ok(default),
    }
}
