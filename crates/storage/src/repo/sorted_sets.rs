use crate::Db;

impl Db {
    pub async fn zadd(&self, key: &str, members: &[(String, f64)]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for (member, score) in members {
            sqlx::query(
                r#"
                INSERT INTO sorted_sets (key, member, score) VALUES (?, ?, ?)
                ON CONFLICT(key, member) DO UPDATE SET score = excluded.score
                "#,
            )
            .bind(key)
            .bind(member)
            .bind(score)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// All members, ordered by score then member.
    pub async fn zrange(&self, key: &str) -> anyhow::Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT member FROM sorted_sets WHERE key = ? ORDER BY score ASC, member ASC",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(member,)| member).collect())
    }

    pub async fn zrem(&self, key: &str, members: &[String]) -> anyhow::Result<u64> {
        let mut removed = 0;
        let mut tx = self.pool.begin().await?;
        for member in members {
            removed += sqlx::query("DELETE FROM sorted_sets WHERE key = ? AND member = ?")
                .bind(key)
                .bind(member)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        Ok(removed)
    }
}
