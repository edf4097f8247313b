use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::{CacheError, CacheStorage};

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// In-process storage backend. Expired entries are dropped when read and
/// swept from the whole map on every write.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CacheStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| entry.expires_at <= now) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let entry = Entry {
            value: value.to_vec(),
            expires_at: now + ttl,
        };
        let mut entries = self.entries.write().await;
        entries.retain(|_, existing| existing.expires_at > now);
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}
