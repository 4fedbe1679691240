use domain::{ActionKind, CriteriaError, ItemKind};
use thiserror::Error;

/// Failure of a single item mutation.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The action does not exist for this kind of item. Never retried or counted.
    #[error("cannot {action} a {kind}")]
    Unsupported { action: ActionKind, kind: ItemKind },

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("You do not have the necessary permissions to nuke the modqueue! You must have at least 'posts' permissions.")]
    PermissionDenied,

    #[error(transparent)]
    InvalidCriteria(#[from] CriteriaError),

    #[error("An error occurred scanning the modqueue")]
    Queue(#[source] anyhow::Error),

    #[error("An error occurred saving the pending actions")]
    Store(#[source] anyhow::Error),
}
