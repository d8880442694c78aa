//! The workflow engine: per-task sub-state machine, pipeline ordering, and
//! the transition rules tying validation, review gates, prompts, and
//! persistence together.

use crate::prompt::domain::{PromptError, ResolvedInstruction};
use crate::prompt::ports::TemplateRenderer;
use crate::prompt::services::PromptResolver;
use crate::workflow::domain::{
    PipelineConfigError, PipelinePlan, ReviewRecord, ReviewerKind, SchemaValidationError,
    SequenceNumber, Stage, StageArtifact, StagePosition, SubState, TaskKey, TaskSnapshot,
    TaskStateError, WorkTask, WorkflowConfig,
};
use crate::workflow::ports::{
    IssueTracker, SnapshotStore, SnapshotStoreError, TrackerError,
};
use crate::workflow::services::gate::{GateAdvance, ReviewGate};
use crate::workflow::validation::ArtifactValidator;
use mockable::Clock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Service-level errors for workflow operations.
///
/// Every error is returned synchronously to the immediate caller and leaves
/// task state unchanged, except [`WorkflowError::ExternalCollaborator`],
/// which is raised after the transition has already been persisted.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The task key is not registered with the engine.
    #[error("unknown task: {0}")]
    UnknownTask(TaskKey),

    /// The task key is already registered with the engine.
    #[error("task already registered: {0}")]
    AlreadyRegistered(TaskKey),

    /// The operation was attempted in the wrong sub-state.
    #[error("invalid transition: {0}")]
    InvalidTransition(#[from] TaskStateError),

    /// The submitted payload does not satisfy the stage schema.
    #[error(transparent)]
    Schema(#[from] SchemaValidationError),

    /// A rejection was issued without feedback notes.
    #[error("rejection of task {task} at stage {stage} requires feedback notes")]
    FeedbackRequired {
        /// The task under review.
        task: TaskKey,
        /// The stage whose artifact was rejected.
        stage: Stage,
    },

    /// A concurrent mutation won; the caller must refetch and retry.
    #[error("stale state for task {task}: expected revision {expected}, found {actual}")]
    Conflict {
        /// The contended task.
        task: TaskKey,
        /// The revision this call was based on.
        expected: SequenceNumber,
        /// The revision actually found.
        actual: SequenceNumber,
    },

    /// The snapshot store failed for a reason other than a conflict.
    #[error(transparent)]
    Snapshot(SnapshotStoreError),

    /// A registered instruction template failed to render.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// A tracker side effect failed; internal state remains consistent and
    /// the task stays parked at its persisted sub-state.
    #[error("external collaborator failed: {0}")]
    ExternalCollaborator(#[from] TrackerError),

    /// The in-process task map lock was poisoned by a panicking thread.
    #[error("task map lock poisoned")]
    LockPoisoned,
}

/// Result type for workflow engine operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Outcome of a successful `submit_work` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    /// The validated, typed artifact.
    pub artifact: StageArtifact,
    /// The task's position after the transition.
    pub position: StagePosition,
    /// Whether the submission completed the pipeline (only possible when
    /// both review gates are disabled).
    pub pipeline_complete: bool,
    /// Sequence number of the snapshot written for this transition.
    pub sequence: SequenceNumber,
}

/// Outcome of a successful `provide_review` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOutcome {
    /// The task's position after the transition.
    pub position: StagePosition,
    /// Whether the approval completed the pipeline.
    pub pipeline_complete: bool,
    /// Sequence number of the snapshot written for this transition.
    pub sequence: SequenceNumber,
}

/// Parameter object wiring the engine's collaborators together.
pub struct EngineParts<S, R, T, C>
where
    S: SnapshotStore,
    R: TemplateRenderer,
    T: IssueTracker,
    C: Clock + Send + Sync,
{
    /// Injected configuration value.
    pub config: WorkflowConfig,
    /// Instruction resolver.
    pub resolver: PromptResolver<R>,
    /// Snapshot persistence.
    pub snapshots: Arc<S>,
    /// Optional tracker integration.
    pub tracker: Option<Arc<T>>,
    /// Clock used for all timestamps.
    pub clock: Arc<C>,
}

/// The per-task workflow state machine.
///
/// The engine is invoked synchronously, once per external call, and holds no
/// background threads: waiting on an AI or human response is represented
/// entirely by the task resting in an `awaiting_*` sub-state between calls.
/// Distinct tasks may be processed concurrently without coordination;
/// operations on a single task are serialised optimistically against the
/// task's revision, and a stale caller receives
/// [`WorkflowError::Conflict`] rather than silently overwriting.
pub struct WorkflowEngine<S, R, T, C>
where
    S: SnapshotStore,
    R: TemplateRenderer,
    T: IssueTracker,
    C: Clock + Send + Sync,
{
    config: WorkflowConfig,
    plan: PipelinePlan,
    gate: ReviewGate,
    validator: ArtifactValidator,
    resolver: PromptResolver<R>,
    snapshots: Arc<S>,
    tracker: Option<Arc<T>>,
    clock: Arc<C>,
    tasks: Arc<RwLock<HashMap<TaskKey, WorkTask>>>,
}

impl<S, R, T, C> WorkflowEngine<S, R, T, C>
where
    S: SnapshotStore,
    R: TemplateRenderer,
    T: IssueTracker,
    C: Clock + Send + Sync,
{
    /// Creates an engine from its collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineConfigError`] when the configured stage list is
    /// malformed.
    pub fn new(parts: EngineParts<S, R, T, C>) -> Result<Self, PipelineConfigError> {
        let plan = parts.config.pipeline_plan()?;
        let gate = ReviewGate::from_config(&parts.config);
        Ok(Self {
            config: parts.config,
            plan,
            gate,
            validator: ArtifactValidator::new(),
            resolver: parts.resolver,
            snapshots: parts.snapshots,
            tracker: parts.tracker,
            clock: parts.clock,
            tasks: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Returns the injected configuration.
    #[must_use]
    pub const fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Returns the pipeline plan derived from the configuration.
    #[must_use]
    pub const fn plan(&self) -> &PipelinePlan {
        &self.plan
    }

    /// Admits a task into the engine and writes its initial snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::AlreadyRegistered`] when the key is taken,
    /// or a persistence error from the snapshot store.
    pub async fn register(&self, task: WorkTask) -> WorkflowResult<SequenceNumber> {
        let key = task.key().clone();
        if self.read_tasks()?.contains_key(&key) {
            return Err(WorkflowError::AlreadyRegistered(key));
        }
        let snapshot = TaskSnapshot::capture(&task, &*self.clock);
        self.snapshots.append(snapshot).await.map_err(map_store_error)?;
        let sequence = task.revision();
        let mut tasks = self.write_tasks()?;
        if tasks.contains_key(&key) {
            return Err(WorkflowError::AlreadyRegistered(key));
        }
        tasks.insert(key, task);
        Ok(sequence)
    }

    /// Reconstructs a task from its latest snapshot and re-admits it.
    ///
    /// Dispatch after recovery reproduces the same instruction text as
    /// before the interruption: dispatch is a pure read of current state.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::UnknownTask`] when the store holds no
    /// snapshot for the key.
    pub async fn recover(&self, key: &TaskKey) -> WorkflowResult<WorkTask> {
        let snapshot = self
            .snapshots
            .latest(key)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| WorkflowError::UnknownTask(key.clone()))?;
        let task = snapshot.state;
        self.write_tasks()?.insert(key.clone(), task.clone());
        Ok(task)
    }

    /// Resolves the instruction text for the task's current position.
    ///
    /// A pure read: no state change, no snapshot. Repeated calls with no
    /// intervening mutation return identical text.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::UnknownTask`] for an unregistered key, or
    /// [`WorkflowError::Prompt`] when a registered template fails to render.
    pub fn dispatch(&self, key: &TaskKey) -> WorkflowResult<ResolvedInstruction> {
        let task = self.task(key)?;
        let position = task.position();
        let instruction = self
            .resolver
            .resolve(position.stage, position.sub_state, &task, None)?;
        Ok(instruction)
    }

    /// Accepts a produced artifact for the task's current stage.
    ///
    /// In `preliminary`, the payload is checked against the stage's
    /// preliminary schema and the task moves to `dispatching` with no review
    /// gate. In `dispatching`, the payload is checked against the stage
    /// schema, stored as pending, and the task enters the first enabled
    /// review gate. When both gates are disabled the artifact is accepted
    /// and the task auto-advances immediately.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Schema`] for an invalid payload (state
    /// unchanged) or [`WorkflowError::InvalidTransition`] when a review is
    /// already pending.
    pub async fn submit_work(
        &self,
        key: &TaskKey,
        payload: &Value,
    ) -> WorkflowResult<SubmissionOutcome> {
        let mut updated = self.task(key)?;
        let base_revision = updated.revision();
        let stage = updated.position().stage;

        let mut pipeline_complete = false;
        let artifact = match updated.position().sub_state {
            SubState::Preliminary => {
                let artifact = self.validator.validate_preliminary(stage, payload)?;
                updated.record_preliminary(artifact.clone(), &*self.clock)?;
                artifact
            }
            SubState::Dispatching => {
                let artifact = self.validator.validate(stage, payload)?;
                updated.submit_pending(artifact.clone(), &*self.clock)?;
                match self.gate.entry_sub_state() {
                    SubState::Accepted => {
                        pipeline_complete = self.accept_and_advance(&mut updated)?;
                    }
                    gate_state => updated.enter_gate(gate_state, &*self.clock)?,
                }
                artifact
            }
            _ => {
                return Err(WorkflowError::InvalidTransition(
                    TaskStateError::WrongSubState {
                        task: key.clone(),
                        position: updated.position(),
                        required: SubState::Dispatching,
                    },
                ));
            }
        };

        let sequence = self.persist(key, base_revision, &mut updated).await?;
        if pipeline_complete {
            self.notify_complete(&updated).await?;
        }
        Ok(SubmissionOutcome {
            artifact,
            position: updated.position(),
            pipeline_complete,
            sequence,
        })
    }

    /// Applies a review outcome at the gate matching the reviewer kind.
    ///
    /// Rejection requires non-empty feedback, stores it verbatim in the
    /// task context keyed by the stage name, discards the pending artifact,
    /// and rewinds to `dispatching` of the same stage. AI approval hands the
    /// artifact to the human gate (or accepts when human approval is
    /// disabled); human approval accepts the stage and auto-advances to the
    /// next enabled stage, completing the pipeline when none remains.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::InvalidTransition`] when called at the wrong
    /// gate or with no review pending, and
    /// [`WorkflowError::FeedbackRequired`] for a rejection without notes.
    pub async fn provide_review(
        &self,
        key: &TaskKey,
        reviewer: ReviewerKind,
        approved: bool,
        feedback: Option<String>,
    ) -> WorkflowResult<ReviewOutcome> {
        let mut updated = self.task(key)?;
        let base_revision = updated.revision();
        let stage = updated.position().stage;

        let expected = ReviewGate::expected_sub_state(reviewer);
        if updated.position().sub_state != expected {
            return Err(WorkflowError::InvalidTransition(
                TaskStateError::WrongSubState {
                    task: key.clone(),
                    position: updated.position(),
                    required: expected,
                },
            ));
        }

        let mut pipeline_complete = false;
        if approved {
            updated.record_review(ReviewRecord::approval(stage, reviewer, &*self.clock));
            match self.gate.after_approval(reviewer) {
                GateAdvance::ToHumanGate => {
                    updated.enter_gate(SubState::AwaitingHumanReview, &*self.clock)?;
                }
                GateAdvance::StageAccepted => {
                    pipeline_complete = self.accept_and_advance(&mut updated)?;
                }
            }
        } else {
            let notes = feedback
                .filter(|notes| !notes.trim().is_empty())
                .ok_or_else(|| WorkflowError::FeedbackRequired {
                    task: key.clone(),
                    stage,
                })?;
            updated.record_review(ReviewRecord::rejection(
                stage,
                reviewer,
                notes.clone(),
                &*self.clock,
            ));
            updated.reject_stage(notes, &*self.clock)?;
        }

        let sequence = self.persist(key, base_revision, &mut updated).await?;
        if pipeline_complete {
            self.notify_complete(&updated).await?;
        }
        Ok(ReviewOutcome {
            position: updated.position(),
            pipeline_complete,
            sequence,
        })
    }

    /// Marks the task inactive and snapshots that fact.
    ///
    /// No further cleanup is required: an unaccepted pending artifact is
    /// simply discarded with the task. Mutating operations on an inactive
    /// task fail as invalid transitions; `dispatch` remains readable.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::InvalidTransition`] when the task is already
    /// inactive.
    pub async fn cancel(&self, key: &TaskKey) -> WorkflowResult<SequenceNumber> {
        let mut updated = self.task(key)?;
        let base_revision = updated.revision();
        if !updated.is_active() {
            return Err(WorkflowError::InvalidTransition(TaskStateError::Inactive(
                key.clone(),
            )));
        }
        updated.deactivate(&*self.clock);
        self.persist(key, base_revision, &mut updated).await
    }

    /// Returns a copy of the task's current state.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::UnknownTask`] for an unregistered key.
    pub fn task(&self, key: &TaskKey) -> WorkflowResult<WorkTask> {
        self.read_tasks()?
            .get(key)
            .cloned()
            .ok_or_else(|| WorkflowError::UnknownTask(key.clone()))
    }

    /// Returns the task's active (stage, sub-state) pair.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::UnknownTask`] for an unregistered key.
    pub fn position(&self, key: &TaskKey) -> WorkflowResult<StagePosition> {
        Ok(self.task(key)?.position())
    }

    /// Returns `true` once the task has passed the final enabled stage.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::UnknownTask`] for an unregistered key.
    pub fn is_complete(&self, key: &TaskKey) -> WorkflowResult<bool> {
        let position = self.position(key)?;
        Ok(position.sub_state == SubState::Accepted
            && self.plan.next_enabled(position.stage).is_none())
    }

    /// Returns the task's full snapshot history for audit.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from the snapshot store.
    pub async fn audit_trail(&self, key: &TaskKey) -> WorkflowResult<Vec<TaskSnapshot>> {
        self.snapshots.history(key).await.map_err(map_store_error)
    }

    /// Accepts the pending artifact and advances to the next enabled stage.
    ///
    /// Returns `true` when no enabled stage remains and the pipeline is
    /// complete; the position then rests at the final stage's `accepted`.
    fn accept_and_advance(&self, task: &mut WorkTask) -> WorkflowResult<bool> {
        task.accept_stage(&*self.clock)?;
        let stage = task.position().stage;
        match self.plan.next_enabled(stage) {
            Some(next) => {
                task.advance_to(self.plan.entry_position(next), &*self.clock)?;
                Ok(false)
            }
            None => Ok(true),
        }
    }

    /// Appends the transition snapshot, then commits the updated task.
    ///
    /// The store's append is the cross-process serialisation point; the
    /// in-process revision check covers callers racing on this engine.
    async fn persist(
        &self,
        key: &TaskKey,
        base_revision: SequenceNumber,
        updated: &mut WorkTask,
    ) -> WorkflowResult<SequenceNumber> {
        updated.bump_revision();
        let snapshot = TaskSnapshot::capture(updated, &*self.clock);
        self.snapshots.append(snapshot).await.map_err(map_store_error)?;

        let mut tasks = self.write_tasks()?;
        let current = tasks
            .get(key)
            .ok_or_else(|| WorkflowError::UnknownTask(key.clone()))?;
        if current.revision() != base_revision {
            return Err(WorkflowError::Conflict {
                task: key.clone(),
                expected: base_revision,
                actual: current.revision(),
            });
        }
        let sequence = updated.revision();
        tasks.insert(key.clone(), updated.clone());
        Ok(sequence)
    }

    async fn notify_complete(&self, task: &WorkTask) -> WorkflowResult<()> {
        if let Some(tracker) = &self.tracker {
            tracker.pipeline_completed(task).await?;
        }
        Ok(())
    }

    fn read_tasks(
        &self,
    ) -> WorkflowResult<std::sync::RwLockReadGuard<'_, HashMap<TaskKey, WorkTask>>> {
        self.tasks.read().map_err(|_| WorkflowError::LockPoisoned)
    }

    fn write_tasks(
        &self,
    ) -> WorkflowResult<std::sync::RwLockWriteGuard<'_, HashMap<TaskKey, WorkTask>>> {
        self.tasks.write().map_err(|_| WorkflowError::LockPoisoned)
    }
}

fn map_store_error(error: SnapshotStoreError) -> WorkflowError {
    match error {
        SnapshotStoreError::SequenceConflict {
            task,
            appended,
            latest,
        } => WorkflowError::Conflict {
            task,
            expected: appended,
            actual: latest,
        },
        other @ SnapshotStoreError::Storage(_) => WorkflowError::Snapshot(other),
    }
}
