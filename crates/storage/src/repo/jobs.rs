use crate::{models::JobRow, Db};
use chrono::{DateTime, Utc};

impl Db {
    pub async fn enqueue_job(
        &self,
        name: &str,
        run_at: DateTime<Utc>,
        payload: &str,
    ) -> anyhow::Result<i64> {
        let id = sqlx::query("INSERT INTO jobs (name, run_at, payload) VALUES (?, ?, ?)")
            .bind(name)
            .bind(run_at.timestamp_millis())
            .bind(payload)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        Ok(id)
    }

    /// Removes and returns up to `limit` jobs due at `now`, earliest first.
    pub async fn claim_due_jobs(&self, now: DateTime<Utc>, limit: i64) -> anyhow::Result<Vec<JobRow>> {
        let mut tx = self.pool.begin().await?;
        let jobs: Vec<JobRow> = sqlx::query_as(
            "SELECT id, name, run_at, payload FROM jobs WHERE run_at <= ? ORDER BY run_at ASC, id ASC LIMIT ?",
        )
        .bind(now.timestamp_millis())
        .bind(limit)
        .fetch_all(&mut *tx)
        .await?;

        for job in &jobs {
            sqlx::query("DELETE FROM jobs WHERE id = ?")
                .bind(job.id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(jobs)
    }

    /// Jobs not yet claimed, earliest first.
    pub async fn pending_jobs(&self) -> anyhow::Result<Vec<JobRow>> {
        let jobs = sqlx::query_as("SELECT id, name, run_at, payload FROM jobs ORDER BY run_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use crate::Db;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn claims_only_due_jobs_once() {
        let db = Db::in_memory().await.unwrap();
        let now = Utc::now();
        db.enqueue_job("nukeModQueue", now - Duration::seconds(1), "{}")
            .await
            .unwrap();
        db.enqueue_job("nukeModQueue", now + Duration::seconds(60), "{}")
            .await
            .unwrap();

        let due = db.claim_due_jobs(now, 10).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].name, "nukeModQueue");
        assert!(db.claim_due_jobs(now, 10).await.unwrap().is_empty());
        assert_eq!(db.pending_jobs().await.unwrap().len(), 1);
    }
}
