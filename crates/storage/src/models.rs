use chrono::{DateTime, TimeZone, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub name: String,
    pub run_at: i64,
    pub payload: String,
}

impl JobRow {
    pub fn run_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.run_at)
            .single()
            .unwrap_or_default()
    }
}
