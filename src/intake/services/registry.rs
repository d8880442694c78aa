//! Task registry: turns external seeds into admitted pipeline tasks.

use crate::intake::ports::{TaskSource, TaskSourceError};
use crate::workflow::domain::{
    NewWorkTask, PipelinePlan, TaskKey, TaskOrigin, TaskStateError, WorkTask,
};
use crate::workflow::ports::{IssueTracker, TrackerError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for task intake.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// No task exists in the source under the key.
    #[error("task not found in source: {0}")]
    NotFound(TaskKey),

    /// The configured pipeline has no enabled stage to start at.
    #[error("pipeline has no enabled stages")]
    NoEnabledStages,

    /// The source failed.
    #[error(transparent)]
    Source(#[from] TaskSourceError),

    /// The seed does not form a valid task.
    #[error("invalid task seed: {0}")]
    InvalidSeed(#[from] TaskStateError),

    /// The tracker's start hook failed.
    #[error("external collaborator failed: {0}")]
    Tracker(#[from] TrackerError),
}

/// Result type for intake operations.
pub type IntakeResult<T> = Result<T, IntakeError>;

/// Loads tasks from their source and positions them at the pipeline's first
/// enabled stage.
///
/// When a tracker is configured, fetching fires its transition-on-start
/// side effect. The hook runs after the task is built, never mutates it, and
/// a hook failure is surfaced for the caller to retry.
#[derive(Clone)]
pub struct TaskIntakeService<S, T, C>
where
    S: TaskSource,
    T: IssueTracker,
    C: Clock + Send + Sync,
{
    source: Arc<S>,
    tracker: Option<Arc<T>>,
    clock: Arc<C>,
}

impl<S, T, C> TaskIntakeService<S, T, C>
where
    S: TaskSource,
    T: IssueTracker,
    C: Clock + Send + Sync,
{
    /// Creates an intake service.
    #[must_use]
    pub const fn new(source: Arc<S>, tracker: Option<Arc<T>>, clock: Arc<C>) -> Self {
        Self {
            source,
            tracker,
            clock,
        }
    }

    /// Fetches a task seed and builds the work task the engine will own.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::NotFound`] when the source holds no task under
    /// the key, or the wrapped source, seed, or tracker error otherwise.
    pub async fn fetch(&self, key: &TaskKey, plan: &PipelinePlan) -> IntakeResult<WorkTask> {
        let seed = self
            .source
            .fetch(key)
            .await?
            .ok_or_else(|| IntakeError::NotFound(key.clone()))?;

        let first_stage = plan.first_enabled().ok_or(IntakeError::NoEnabledStages)?;
        let mut origin = TaskOrigin::new(seed.source);
        if let Some(reference) = seed.reference {
            origin = origin.with_reference(reference);
        }
        let task = WorkTask::new(
            NewWorkTask {
                key: seed.task_id,
                title: seed.title,
                description: seed.description,
                acceptance_criteria: seed.acceptance_criteria,
                origin,
                position: plan.entry_position(first_stage),
                context: seed.context,
            },
            &*self.clock,
        )?;

        if let Some(tracker) = &self.tracker {
            tracker.pipeline_started(&task).await?;
        }
        Ok(task)
    }
}
