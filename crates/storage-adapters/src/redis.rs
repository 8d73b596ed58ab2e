//! Redis-backed implementation of the `MetadataStore` port.
//!
//! Ordered sets map to ZSETs, sets to SETs, maps to HASHes. Each port method
//! issues exactly one command, so the atomicity contract of the port is the
//! atomicity of the command itself.

use std::collections::HashMap;

use async_trait::async_trait;
use deadpool_redis::redis::cmd;
use deadpool_redis::{Config, Connection, Pool, Runtime};

use domains::{AppError, MetadataStore, Result};

pub struct RedisMetadataStore {
    pool: Pool,
}

fn store_err(err: deadpool_redis::redis::RedisError) -> AppError {
    AppError::Upstream(format!("redis: {err}"))
}

impl RedisMetadataStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn from_url(url: &str) -> Result<Self> {
        let pool = Config::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|err| AppError::Upstream(format!("redis pool: {err}")))?;
        Ok(Self { pool })
    }

    async fn conn(&self) -> Result<Connection> {
        self.pool
            .get()
            .await
            .map_err(|err| AppError::Upstream(format!("redis connection: {err}")))
    }
}

#[async_trait]
impl MetadataStore for RedisMetadataStore {
    async fn ranked_insert(&self, key: &str, score: u64, member: &str) -> Result<u64> {
        let mut conn = self.conn().await?;
        let added: u64 = cmd("ZADD")
            .arg(key)
            .arg(score)
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(added)
    }

    async fn ranked_insert_many(&self, key: &str, entries: &[(u64, String)]) -> Result<u64> {
        let mut conn = self.conn().await?;
        let mut zadd = cmd("ZADD");
        // CH: count re-scored members, not just newly added ones
        zadd.arg(key).arg("CH");
        for (score, member) in entries {
            zadd.arg(*score).arg(member);
        }
        let changed: u64 = zadd.query_async(&mut conn).await.map_err(store_err)?;
        Ok(changed)
    }

    async fn ranked_remove(&self, key: &str, member: &str) -> Result<u64> {
        let mut conn = self.conn().await?;
        let removed: u64 = cmd("ZREM")
            .arg(key)
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(removed)
    }

    async fn ranked_entries(&self, key: &str) -> Result<Vec<(String, u64)>> {
        let mut conn = self.conn().await?;
        let entries: Vec<(String, u64)> = cmd("ZRANGE")
            .arg(key)
            .arg(0)
            .arg(-1)
            .arg("WITHSCORES")
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(entries)
    }

    async fn ranked_len(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn().await?;
        let len: u64 = cmd("ZCARD")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(len)
    }

    async fn ranked_score(&self, key: &str, member: &str) -> Result<Option<u64>> {
        let mut conn = self.conn().await?;
        let score: Option<u64> = cmd("ZSCORE")
            .arg(key)
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(score)
    }

    async fn set_insert(&self, key: &str, member: &str) -> Result<u64> {
        let mut conn = self.conn().await?;
        let added: u64 = cmd("SADD")
            .arg(key)
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(added)
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<u64> {
        let mut conn = self.conn().await?;
        let removed: u64 = cmd("SREM")
            .arg(key)
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(removed)
    }

    async fn set_contains(&self, key: &str, member: &str) -> Result<bool> {
        let mut conn = self.conn().await?;
        let hit: bool = cmd("SISMEMBER")
            .arg(key)
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(hit)
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.conn().await?;
        let members: Vec<String> = cmd("SMEMBERS")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(members)
    }

    async fn map_put(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let mut conn = self.conn().await?;
        let _: u64 = cmd("HSET")
            .arg(key)
            .arg(field)
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn map_remove(&self, key: &str, field: &str) -> Result<u64> {
        let mut conn = self.conn().await?;
        let removed: u64 = cmd("HDEL")
            .arg(key)
            .arg(field)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(removed)
    }

    async fn map_entries(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut conn = self.conn().await?;
        let entries: HashMap<String, String> = cmd("HGETALL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(entries)
    }

    async fn delete_key(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn().await?;
        let removed: u64 = cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(removed)
    }

    async fn expire_key_at(&self, key: &str, unix_secs: i64) -> Result<bool> {
        let mut conn = self.conn().await?;
        let set: bool = cmd("EXPIREAT")
            .arg(key)
            .arg(unix_secs)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(set)
    }
}
