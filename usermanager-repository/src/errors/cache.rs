//! Error types for the cache.
use thiserror::Error;

/// Represents errors that can occur while reading or writing the cache.
///
/// A missing key is not an error: lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}
