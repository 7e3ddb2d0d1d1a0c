use anyhow::Result;
use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use crate::app::ports::KeyValueStore;

const KEY_PREFIX: &str = "rentdesk:local";

/// Redis-backed local store, for deployments running more than one
/// instance against the same rejection cache.
#[derive(Clone)]
pub struct RedisCache {
    client: Client,
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(Self { client })
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }

    fn key(name: &str) -> String {
        format!("{}:{}", KEY_PREFIX, name)
    }
}

#[async_trait]
impl KeyValueStore for RedisCache {
    async fn get(&self, name: &str) -> Result<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(Self::key(name)).await?;
        Ok(value)
    }

    async fn set(&self, name: &str, value: &str) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(Self::key(name), value).await?;
        Ok(())
    }
}
