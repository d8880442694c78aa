//! Source port abstracting over a task's origin.

use crate::intake::domain::TaskSeed;
use crate::workflow::domain::TaskKey;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task source operations.
pub type TaskSourceResult<T> = Result<T, TaskSourceError>;

/// Fetches task data from wherever tasks originate: a local file matching a
/// configured naming pattern, or an external tracker.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetches the seed for a task key.
    ///
    /// Returns `None` when the source holds no task under the key.
    async fn fetch(&self, key: &TaskKey) -> TaskSourceResult<Option<TaskSeed>>;
}

/// Errors returned by task source implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskSourceError {
    /// A task record exists but could not be parsed.
    #[error("task record '{record}' could not be parsed: {reason}")]
    Parse {
        /// The record that failed to parse (file name or tracker key).
        record: String,
        /// Parser-supplied failure reason.
        reason: String,
    },

    /// Transport or filesystem failure.
    #[error("task source error: {0}")]
    Io(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskSourceError {
    /// Wraps an I/O error.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Io(Arc::new(err))
    }
}
