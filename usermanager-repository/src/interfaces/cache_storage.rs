use std::time::Duration;

use crate::errors::CacheError;

/// Trait for key-value cache backends.
///
/// Values are opaque bytes; the typed caches in [`crate::cache`] own key
/// derivation and serialization.
#[async_trait::async_trait]
pub trait CacheStorage: Send + Sync {
    /// Reads a key. `Ok(None)` on a miss or an expired entry.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Writes a key that expires after `ttl`.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;

    /// Removes keys. Missing keys are ignored.
    async fn delete(&self, keys: &[String]) -> Result<(), CacheError>;
}
