//! Sequence-numbered task snapshots for recovery and audit.

use super::{SequenceNumber, TaskKey, WorkTask};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable, sequence-numbered copy of a task taken after a transition.
///
/// Snapshots are append-only: sequence numbers per task are strictly
/// increasing, and a stored snapshot is never mutated. The latest snapshot is
/// sufficient to reconstruct the task after a process restart; the full
/// history serves audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Unique identifier for this snapshot.
    pub snapshot_id: Uuid,
    /// The task this snapshot belongs to.
    pub task_key: TaskKey,
    /// Position of this snapshot in the task's history.
    pub sequence: SequenceNumber,
    /// When the snapshot was captured.
    pub captured_at: DateTime<Utc>,
    /// The full task state at capture time.
    pub state: WorkTask,
}

impl TaskSnapshot {
    /// Captures the task's current state under its current revision.
    #[must_use]
    pub fn capture(task: &WorkTask, clock: &impl mockable::Clock) -> Self {
        Self {
            snapshot_id: Uuid::new_v4(),
            task_key: task.key().clone(),
            sequence: task.revision(),
            captured_at: clock.utc(),
            state: task.clone(),
        }
    }
}
