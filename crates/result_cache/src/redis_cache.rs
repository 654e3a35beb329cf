use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use redis::AsyncCommands;

use crate::ResultCache;

/// Redis-backed cache; expiry is enforced server-side via `SET ... EX`.
///
/// Read and write failures are logged and degrade to cache misses, so an
/// unreachable Redis slows requests down but does not fail them.
#[derive(Clone)]
pub struct RedisCache {
    client: redis::Client,
}

impl RedisCache {
    pub fn new(client: redis::Client) -> Self {
        RedisCache { client }
    }

    async fn read(&self, key: &str) -> Result<Option<String>, redis::RedisError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.get(key).await
    }

    async fn write(&self, key: &str, value: &str, ttl: Duration) -> Result<(), redis::RedisError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let _: () = con.set_ex(key, value, ttl.as_secs()).await?;
        Ok(())
    }
}

#[async_trait]
impl ResultCache for RedisCache {
    async fn fetch(&self, key: &str) -> Option<String> {
        match self.read(key).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("redis cache read failed | key: {} | {}", key, e);
                None
            }
        }
    }

    async fn store(&self, key: &str, value: &str, ttl: Duration) {
        if let Err(e) = self.write(key, value, ttl).await {
            warn!("redis cache write failed | key: {} | {}", key, e);
        }
    }
}
