use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::{CacheError, CacheStorage};

/// Redis storage backend over a reconnecting [`ConnectionManager`].
#[derive(Clone)]
pub struct RedisStorage {
    connection: ConnectionManager,
}

impl RedisStorage {
    pub async fn new(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let connection = client.get_connection_manager().await?;
        tracing::info!("Connected to Redis");
        Ok(Self { connection })
    }
}

#[async_trait::async_trait]
impl CacheStorage for RedisStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut connection = self.connection.clone();
        let value: Option<Vec<u8>> = connection.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        // SET EX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        connection.set_ex::<_, _, ()>(key, value, seconds).await?;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), CacheError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut connection = self.connection.clone();
        connection.del::<_, ()>(keys).await?;
        Ok(())
    }
}
