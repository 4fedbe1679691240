mod batch;
mod criteria;
mod events;
pub mod filter;
pub mod format;
mod jobs;
mod models;
pub mod predicates;

pub use batch::{ActionBatch, ActionKind, ActionList, ActionResult, KindCounts};
pub use criteria::{CriteriaError, FilterCriteria, ItemTypeSelection};
pub use events::{IgnoredEvent, ModActionEvent, TriggerKind};
pub use filter::{Destination, FilterEngine, ScanOutcome, SkippedItem};
pub use jobs::{lock_key, work_queue_key, RemovalJob, NUKE_QUEUE_JOB};
pub use models::{ItemContent, ItemId, ItemKind, QueueItem};
