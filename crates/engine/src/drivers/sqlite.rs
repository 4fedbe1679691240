use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use storage::Db;
use tracing::debug;

use crate::traits::{JobScheduler, KeyValueStore};

#[async_trait]
impl KeyValueStore for Db {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.kv_get(key, Utc::now()).await
    }

    async fn set_many(&self, entries: &[(String, String)]) -> Result<()> {
        self.kv_set_many(entries).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.delete_key(key).await
    }

    async fn create_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let now = Utc::now();
        self.kv_create_if_absent(key, value, now + ttl, now).await
    }

    async fn sorted_set_add(&self, key: &str, members: &[(String, f64)]) -> Result<()> {
        self.zadd(key, members).await
    }

    async fn sorted_set_range(&self, key: &str) -> Result<Vec<String>> {
        self.zrange(key).await
    }

    async fn sorted_set_remove(&self, key: &str, members: &[String]) -> Result<()> {
        self.zrem(key, members).await.map(|_| ())
    }
}

#[async_trait]
impl JobScheduler for Db {
    async fn schedule(&self, name: &str, run_at: DateTime<Utc>, payload: serde_json::Value) -> Result<()> {
        let id = self.enqueue_job(name, run_at, &payload.to_string()).await?;
        debug!("Scheduled job {} #{} for {}", name, id, run_at);
        Ok(())
    }
}
