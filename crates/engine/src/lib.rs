mod coordinator;
mod dispatcher;
mod drivers;
mod error;
mod pending;
mod traits;
mod triage;
mod worker;

pub use coordinator::{DeferredRemovalCoordinator, JobOutcome, TriggerOutcome};
pub use dispatcher::ActionDispatcher;
pub use drivers::gateway::{GatewayClient, GatewayConfig};
pub use error::{ActionError, ScanError};
pub use pending::{PendingActionStore, PendingScope};
pub use traits::{ItemMutator, ItemResolver, JobScheduler, KeyValueStore, Platform, QueueSource};
pub use triage::{NukeReport, ScanReport, Triage};
pub use worker::JobWorker;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Attempts per item for batch actions, and runs of the removal job.
    pub retry_limit: u32,
    pub nuke_on_post_remove: bool,
    pub nuke_on_post_lock: bool,
    pub lock_ttl_secs: u64,
    pub initial_delay_secs: u64,
    pub retry_delay_secs: u64,
    pub queue_fetch_limit: u32,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            retry_limit: 3,
            nuke_on_post_remove: false,
            nuke_on_post_lock: false,
            lock_ttl_secs: 10,
            initial_delay_secs: 1,
            retry_delay_secs: 60,
            queue_fetch_limit: 1000,
        }
    }
}
