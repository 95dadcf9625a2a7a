//! Errors returned by engine operations.

use thiserror::Error;
use todo_sync_core::{ItemKey, PersistenceError, TodoId};

/// Errors that can occur while mutating or loading the collection.
///
/// Every variant leaves the collection consistent with the last state the remote
/// store confirmed: failed creates are rolled back, failed updates are reverted and
/// failed deletes remove nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The remote call failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// The item's create call has not completed, so it has no address to update or
    /// delete yet.
    #[error("{0} has not been persisted yet")]
    NotYetPersisted(ItemKey),

    /// The item is no longer part of the collection (destroyed or replaced by a load).
    #[error("{0} is no longer part of the collection")]
    Detached(ItemKey),

    /// A load is in flight; creates and further loads wait for it.
    #[error("A load is already in progress")]
    LoadInProgress,

    /// Creates are still waiting for the remote store; a load would drop their items.
    #[error("{0} create call(s) still pending")]
    CreatePending(usize),

    /// Some item already holds the largest representable order.
    #[error("No order left after {0}")]
    OrderExhausted(i64),

    /// The remote store assigned an identifier already held by another item.
    #[error("Remote store assigned duplicate identifier {0}")]
    DuplicateId(TodoId),
}

impl SyncError {
    /// Whether the failure came from the remote store rather than a local rule.
    #[must_use]
    pub const fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}
