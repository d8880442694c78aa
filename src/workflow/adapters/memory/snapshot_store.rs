//! In-memory snapshot store for tests and single-process embedding.

use crate::workflow::domain::{SequenceNumber, TaskKey, TaskSnapshot};
use crate::workflow::ports::{SnapshotStore, SnapshotStoreError, SnapshotStoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory snapshot store.
///
/// Enforces the append-only sequence contract exactly like a durable store,
/// which makes it the primary test double.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotStore {
    state: Arc<RwLock<HashMap<TaskKey, Vec<TaskSnapshot>>>>,
}

impl InMemorySnapshotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl std::fmt::Display) -> SnapshotStoreError {
    SnapshotStoreError::storage(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn append(&self, snapshot: TaskSnapshot) -> SnapshotStoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let history = state.entry(snapshot.task_key.clone()).or_default();
        let expected = history
            .last()
            .map_or_else(SequenceNumber::first, |last| last.sequence.next());
        if snapshot.sequence != expected {
            let latest = history
                .last()
                .map_or(SequenceNumber::new(0), |last| last.sequence);
            return Err(SnapshotStoreError::SequenceConflict {
                task: snapshot.task_key.clone(),
                appended: snapshot.sequence,
                latest,
            });
        }
        history.push(snapshot);
        Ok(())
    }

    async fn latest(&self, task: &TaskKey) -> SnapshotStoreResult<Option<TaskSnapshot>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.get(task).and_then(|history| history.last().cloned()))
    }

    async fn history(&self, task: &TaskKey) -> SnapshotStoreResult<Vec<TaskSnapshot>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.get(task).cloned().unwrap_or_default())
    }
}
