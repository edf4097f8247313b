//! Cache-aside repositories for users and votes.
//!
//! ## Usage
//!
//! ```ignore
//! use usermanager_repository::{CacheSource, UserCache, DEFAULT_CACHE_TTL};
//!
//! // Development: in-process storage
//! let storage = CacheSource::memory().into_storage().await?;
//!
//! // Production: Redis
//! let storage = CacheSource::redis("redis://localhost:6379").into_storage().await?;
//!
//! let users = UserCache::new(storage, DEFAULT_CACHE_TTL);
//! ```
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{CacheError, CacheStorage};

mod memory_storage;
mod redis_storage;
mod user_cache;
mod vote_cache;

pub use memory_storage::MemoryStorage;
pub use redis_storage::RedisStorage;
pub use user_cache::UserCache;
pub use vote_cache::VoteCache;

/// Lifetime of every cache entry unless configured otherwise.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Configuration for the cache storage backend.
#[derive(Debug, Clone)]
pub enum CacheSource {
    /// In-process storage for development and tests.
    Memory,

    /// Redis storage.
    Redis {
        /// Redis connection URL
        url: String,
    },
}

impl CacheSource {
    pub fn memory() -> Self {
        Self::Memory
    }

    pub fn redis(url: impl Into<String>) -> Self {
        Self::Redis { url: url.into() }
    }

    /// Connects the selected backend.
    pub async fn into_storage(self) -> Result<Arc<dyn CacheStorage>, CacheError> {
        match self {
            Self::Memory => Ok(Arc::new(MemoryStorage::new())),
            Self::Redis { url } => Ok(Arc::new(RedisStorage::new(&url).await?)),
        }
    }
}

async fn get_json<T: DeserializeOwned>(
    storage: &dyn CacheStorage,
    key: &str,
) -> Result<Option<T>, CacheError> {
    match storage.get(key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

async fn set_json<T: Serialize + ?Sized>(
    storage: &dyn CacheStorage,
    key: &str,
    value: &T,
    ttl: Duration,
) -> Result<(), CacheError> {
    let bytes = serde_json::to_vec(value)?;
    storage.set(key, &bytes, ttl).await
}
