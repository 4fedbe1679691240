use crate::Db;
use chrono::{DateTime, Utc};
use sqlx::Row;

impl Db {
    pub async fn kv_get(&self, key: &str, now: DateTime<Utc>) -> anyhow::Result<Option<String>> {
        let row = sqlx::query(
            "SELECT value FROM kv WHERE key = ? AND (expires_at IS NULL OR expires_at > ?)",
        )
        .bind(key)
        .bind(now.timestamp_millis())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.get(0)))
    }

    /// Writes every entry or none of them.
    pub async fn kv_set_many(&self, entries: &[(String, String)]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in entries {
            sqlx::query(
                r#"
                INSERT INTO kv (key, value, expires_at) VALUES (?, ?, NULL)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    expires_at = NULL
                "#,
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Creates `key` unless a live entry exists. Returns `true` if this call created it.
    pub async fn kv_create_if_absent(
        &self,
        key: &str,
        value: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM kv WHERE key = ? AND expires_at IS NOT NULL AND expires_at <= ?")
            .bind(key)
            .bind(now.timestamp_millis())
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query(
            "INSERT INTO kv (key, value, expires_at) VALUES (?, ?, ?) ON CONFLICT(key) DO NOTHING",
        )
        .bind(key)
        .bind(value)
        .bind(expires_at.timestamp_millis())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        Ok(inserted == 1)
    }

    /// Deletes the key from both the key-value table and the sorted sets.
    pub async fn delete_key(&self, key: &str) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sorted_sets WHERE key = ?")
            .bind(key)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
