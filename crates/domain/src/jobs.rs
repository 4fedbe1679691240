use serde::{Deserialize, Serialize};

use crate::models::ItemId;

/// Name of the self-rescheduling deferred comment removal job.
pub const NUKE_QUEUE_JOB: &str = "nukeModQueue";

pub fn lock_key(post_id: &ItemId) -> String {
    format!("nukeLock:{}", post_id)
}

pub fn work_queue_key(post_id: &ItemId) -> String {
    format!("nukeQueue:{}", post_id)
}

/// Payload of one removal job run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalJob {
    pub work_key: String,
    #[serde(default = "first_attempt")]
    pub attempt: u32,
}

fn first_attempt() -> u32 {
    1
}

impl RemovalJob {
    pub fn first(work_key: impl Into<String>) -> Self {
        Self {
            work_key: work_key.into(),
            attempt: 1,
        }
    }

    pub fn next(&self) -> Self {
        Self {
            work_key: self.work_key.clone(),
            attempt: self.attempt + 1,
        }
    }
}
