//! Task aggregate root: the single mutable record of a task's pipeline run.
//!
//! Mutation methods are crate-private: only the workflow engine drives
//! transitions. Everything else reads the aggregate through its accessors.

use super::{
    ReviewRecord, SequenceNumber, Stage, StageArtifact, StagePosition, SubState, TaskKey,
    TaskOrigin, TaskStateError,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parameter object for admitting a new task into the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkTask {
    /// Externally assigned task identifier.
    pub key: TaskKey,
    /// Task title.
    pub title: String,
    /// Full task description.
    pub description: String,
    /// Ordered acceptance criteria.
    pub acceptance_criteria: Vec<String>,
    /// Which external system the task came from.
    pub origin: TaskOrigin,
    /// The position the task starts at (the first enabled stage's initial
    /// sub-state).
    pub position: StagePosition,
    /// Initial cross-stage context notes.
    pub context: BTreeMap<String, Value>,
}

/// Task aggregate root.
///
/// Holds exactly one active (stage, sub-state) position at all times,
/// accepted artifacts keyed by stage, preliminary-check artifacts, the
/// cross-stage context map, and the review audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkTask {
    key: TaskKey,
    title: String,
    description: String,
    acceptance_criteria: Vec<String>,
    origin: TaskOrigin,
    artifacts: BTreeMap<Stage, StageArtifact>,
    preflight: BTreeMap<Stage, StageArtifact>,
    context: BTreeMap<String, Value>,
    review_log: Vec<ReviewRecord>,
    pending_artifact: Option<StageArtifact>,
    position: StagePosition,
    active: bool,
    revision: SequenceNumber,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WorkTask {
    /// Creates a task at its starting position with revision 1.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStateError::EmptyTitle`] when the title is empty after
    /// trimming.
    pub fn new(data: NewWorkTask, clock: &impl Clock) -> Result<Self, TaskStateError> {
        if data.title.trim().is_empty() {
            return Err(TaskStateError::EmptyTitle);
        }
        let timestamp = clock.utc();
        Ok(Self {
            key: data.key,
            title: data.title,
            description: data.description,
            acceptance_criteria: data.acceptance_criteria,
            origin: data.origin,
            artifacts: BTreeMap::new(),
            preflight: BTreeMap::new(),
            context: data.context,
            review_log: Vec::new(),
            pending_artifact: None,
            position: data.position,
            active: true,
            revision: SequenceNumber::first(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Returns the task key.
    #[must_use]
    pub const fn key(&self) -> &TaskKey {
        &self.key
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the ordered acceptance criteria.
    #[must_use]
    pub fn acceptance_criteria(&self) -> &[String] {
        &self.acceptance_criteria
    }

    /// Returns the task origin.
    #[must_use]
    pub const fn origin(&self) -> &TaskOrigin {
        &self.origin
    }

    /// Returns accepted artifacts keyed by stage.
    #[must_use]
    pub const fn artifacts(&self) -> &BTreeMap<Stage, StageArtifact> {
        &self.artifacts
    }

    /// Returns preliminary-check artifacts keyed by stage.
    #[must_use]
    pub const fn preflight(&self) -> &BTreeMap<Stage, StageArtifact> {
        &self.preflight
    }

    /// Returns the cross-stage context map.
    #[must_use]
    pub const fn context(&self) -> &BTreeMap<String, Value> {
        &self.context
    }

    /// Returns rejection feedback recorded for `stage`, if any.
    #[must_use]
    pub fn feedback_for(&self, stage: Stage) -> Option<&str> {
        self.context.get(stage.as_str()).and_then(Value::as_str)
    }

    /// Returns the review audit log, oldest first.
    #[must_use]
    pub fn review_log(&self) -> &[ReviewRecord] {
        &self.review_log
    }

    /// Returns the artifact awaiting review, if any.
    #[must_use]
    pub const fn pending_artifact(&self) -> Option<&StageArtifact> {
        self.pending_artifact.as_ref()
    }

    /// Returns the active (stage, sub-state) pair.
    #[must_use]
    pub const fn position(&self) -> StagePosition {
        self.position
    }

    /// Returns `false` once the task has been cancelled.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the revision matching the latest snapshot sequence.
    #[must_use]
    pub const fn revision(&self) -> SequenceNumber {
        self.revision
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest transition timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Records a preliminary-check artifact and moves the stage to
    /// `dispatching`.
    pub(crate) fn record_preliminary(
        &mut self,
        artifact: StageArtifact,
        clock: &impl Clock,
    ) -> Result<(), TaskStateError> {
        self.ensure_active()?;
        if self.position.sub_state != SubState::Preliminary {
            return Err(self.wrong_sub_state(SubState::Preliminary));
        }
        self.preflight.insert(self.position.stage, artifact);
        self.position.sub_state = SubState::Dispatching;
        self.touch(clock);
        Ok(())
    }

    /// Stores a validated artifact as pending review.
    pub(crate) fn submit_pending(
        &mut self,
        artifact: StageArtifact,
        clock: &impl Clock,
    ) -> Result<(), TaskStateError> {
        self.ensure_active()?;
        if self.position.sub_state != SubState::Dispatching {
            return Err(self.wrong_sub_state(SubState::Dispatching));
        }
        if artifact.stage() != Some(self.position.stage) {
            return Err(TaskStateError::ArtifactStageMismatch {
                task: self.key.clone(),
                stage: self.position.stage,
            });
        }
        self.pending_artifact = Some(artifact);
        self.touch(clock);
        Ok(())
    }

    /// Moves the pending artifact to a review gate.
    pub(crate) fn enter_gate(
        &mut self,
        gate: SubState,
        clock: &impl Clock,
    ) -> Result<(), TaskStateError> {
        self.ensure_active()?;
        if self.pending_artifact.is_none() {
            return Err(TaskStateError::NoPendingArtifact {
                task: self.key.clone(),
                stage: self.position.stage,
            });
        }
        if !gate.is_gate() {
            return Err(self.wrong_sub_state(gate));
        }
        self.position.sub_state = gate;
        self.touch(clock);
        Ok(())
    }

    /// Appends a gate attempt to the review log.
    pub(crate) fn record_review(&mut self, record: ReviewRecord) {
        self.review_log.push(record);
    }

    /// Discards the pending artifact, stores the rejection feedback in the
    /// context keyed by the stage name, and rewinds to `dispatching` of the
    /// same stage.
    pub(crate) fn reject_stage(
        &mut self,
        feedback: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskStateError> {
        self.ensure_active()?;
        if self.pending_artifact.take().is_none() {
            return Err(TaskStateError::NoPendingArtifact {
                task: self.key.clone(),
                stage: self.position.stage,
            });
        }
        self.context.insert(
            self.position.stage.as_str().to_owned(),
            Value::String(feedback.into()),
        );
        self.position.sub_state = SubState::Dispatching;
        self.touch(clock);
        Ok(())
    }

    /// Promotes the pending artifact to the accepted set and marks the
    /// stage `accepted`.
    pub(crate) fn accept_stage(&mut self, clock: &impl Clock) -> Result<(), TaskStateError> {
        self.ensure_active()?;
        if self.artifacts.contains_key(&self.position.stage) {
            return Err(TaskStateError::ArtifactAlreadyAccepted {
                task: self.key.clone(),
                stage: self.position.stage,
            });
        }
        let Some(artifact) = self.pending_artifact.take() else {
            return Err(TaskStateError::NoPendingArtifact {
                task: self.key.clone(),
                stage: self.position.stage,
            });
        };
        self.artifacts.insert(self.position.stage, artifact);
        self.position.sub_state = SubState::Accepted;
        self.touch(clock);
        Ok(())
    }

    /// Moves the task to the entry position of its next stage.
    pub(crate) fn advance_to(
        &mut self,
        position: StagePosition,
        clock: &impl Clock,
    ) -> Result<(), TaskStateError> {
        self.ensure_active()?;
        if self.position.sub_state != SubState::Accepted {
            return Err(self.wrong_sub_state(SubState::Accepted));
        }
        self.position = position;
        self.touch(clock);
        Ok(())
    }

    /// Marks the task inactive.
    pub(crate) fn deactivate(&mut self, clock: &impl Clock) {
        self.active = false;
        self.touch(clock);
    }

    /// Advances the revision to match the next snapshot sequence.
    pub(crate) const fn bump_revision(&mut self) {
        self.revision = self.revision.next();
    }

    fn ensure_active(&self) -> Result<(), TaskStateError> {
        if self.active {
            Ok(())
        } else {
            Err(TaskStateError::Inactive(self.key.clone()))
        }
    }

    fn wrong_sub_state(&self, required: SubState) -> TaskStateError {
        TaskStateError::WrongSubState {
            task: self.key.clone(),
            position: self.position,
            required,
        }
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
