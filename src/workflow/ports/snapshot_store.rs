//! Persistence port for sequence-numbered task snapshots.

use crate::workflow::domain::{SequenceNumber, TaskKey, TaskSnapshot};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for snapshot store operations.
pub type SnapshotStoreResult<T> = Result<T, SnapshotStoreError>;

/// Durable snapshot persistence contract.
///
/// Stores are append-only per task. `append` is the serialisation point for
/// concurrent writers: a snapshot whose sequence is not exactly the successor
/// of the latest stored sequence (or 1 for a task's first snapshot) must be
/// rejected with [`SnapshotStoreError::SequenceConflict`], never silently
/// overwritten.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Appends a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotStoreError::SequenceConflict`] when the snapshot's
    /// sequence does not extend the stored history, or
    /// [`SnapshotStoreError::Storage`] on persistence failure.
    async fn append(&self, snapshot: TaskSnapshot) -> SnapshotStoreResult<()>;

    /// Returns the latest snapshot of the task, if any exists.
    async fn latest(&self, task: &TaskKey) -> SnapshotStoreResult<Option<TaskSnapshot>>;

    /// Returns the task's full snapshot history in sequence order.
    async fn history(&self, task: &TaskKey) -> SnapshotStoreResult<Vec<TaskSnapshot>>;
}

/// Errors returned by snapshot store implementations.
#[derive(Debug, Clone, Error)]
pub enum SnapshotStoreError {
    /// The appended sequence does not extend the stored history.
    #[error("sequence conflict for task {task}: appended {appended}, latest stored {latest}")]
    SequenceConflict {
        /// The task whose history was extended.
        task: TaskKey,
        /// The sequence number of the rejected snapshot.
        appended: SequenceNumber,
        /// The latest sequence already stored.
        latest: SequenceNumber,
    },

    /// Persistence-layer failure.
    #[error("snapshot storage error: {0}")]
    Storage(Arc<dyn std::error::Error + Send + Sync>),
}

impl SnapshotStoreError {
    /// Wraps a storage error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Arc::new(err))
    }
}
