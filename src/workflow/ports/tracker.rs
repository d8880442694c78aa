//! Issue-tracker side-effect port.

use crate::workflow::domain::WorkTask;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for tracker operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// External tracker hooks fired around pipeline lifecycle events.
///
/// These are fire-and-report side effects: the engine triggers them but never
/// observes tracker state, and a hook failure leaves the task parked at its
/// already-persisted position for manual intervention.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Invoked when a task's pipeline run starts.
    async fn pipeline_started(&self, task: &WorkTask) -> TrackerResult<()>;

    /// Invoked when a task's pipeline run completes.
    async fn pipeline_completed(&self, task: &WorkTask) -> TrackerResult<()>;
}

/// Errors returned by tracker integrations.
#[derive(Debug, Clone, Error)]
pub enum TrackerError {
    /// The tracker rejected the requested status transition.
    #[error("tracker rejected transition '{transition}': {reason}")]
    TransitionRejected {
        /// The configured transition name.
        transition: String,
        /// Tracker-supplied rejection reason.
        reason: String,
    },

    /// Transport or API failure.
    #[error("tracker call failed: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl TrackerError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}

/// Tracker adapter that performs no side effects.
///
/// Used when no tracker integration is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracker;

#[async_trait]
impl IssueTracker for NoopTracker {
    async fn pipeline_started(&self, _task: &WorkTask) -> TrackerResult<()> {
        Ok(())
    }

    async fn pipeline_completed(&self, _task: &WorkTask) -> TrackerResult<()> {
        Ok(())
    }
}
