//! Error types for workflow domain validation and state transitions.

use super::{Stage, StagePosition, SubState, TaskKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by invalid mutations of the task aggregate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskStateError {
    /// The task key is empty.
    #[error("task key must not be empty")]
    EmptyTaskKey,

    /// The task title is empty.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The operation is not valid in the task's current sub-state.
    #[error("task {task} is at {position}; operation requires sub-state {required}")]
    WrongSubState {
        /// The task being mutated.
        task: TaskKey,
        /// Its current position.
        position: StagePosition,
        /// The sub-state the operation requires.
        required: SubState,
    },

    /// A review operation found no pending artifact.
    #[error("task {task} has no pending artifact at stage {stage}")]
    NoPendingArtifact {
        /// The task being mutated.
        task: TaskKey,
        /// The stage under review.
        stage: Stage,
    },

    /// A stage that already holds an accepted artifact was accepted again.
    #[error("stage {stage} of task {task} already holds an accepted artifact")]
    ArtifactAlreadyAccepted {
        /// The task being mutated.
        task: TaskKey,
        /// The stage in question.
        stage: Stage,
    },

    /// The submitted artifact's schema does not belong to the active stage.
    #[error("artifact does not match stage {stage} of task {task}")]
    ArtifactStageMismatch {
        /// The task being mutated.
        task: TaskKey,
        /// The active stage.
        stage: Stage,
    },

    /// The task has been cancelled.
    #[error("task {0} is inactive")]
    Inactive(TaskKey),
}

/// A single schema violation, naming the offending field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Path of the offending field (for example `test_results[1].status`).
    pub field: String,
    /// Why the value was rejected.
    pub reason: String,
}

impl FieldViolation {
    /// Creates a violation entry.
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A rejected submission: the payload does not satisfy the stage's schema.
///
/// All violations are collected before the error is returned; the caller
/// corrects the payload and resubmits. Task state is never changed by a
/// failed validation.
#[derive(Debug, Clone, Error, PartialEq)]
#[error(
    "payload rejected for stage {stage}: missing [{}], invalid [{}]",
    .missing_fields.join(", "),
    format_violations(.invalid_fields)
)]
pub struct SchemaValidationError {
    /// The stage whose schema was applied.
    pub stage: Stage,
    /// Required fields absent from the payload.
    pub missing_fields: Vec<String>,
    /// Fields present but rejected.
    pub invalid_fields: Vec<FieldViolation>,
}

impl SchemaValidationError {
    /// Creates a validation error from collected violations.
    #[must_use]
    pub const fn new(
        stage: Stage,
        missing_fields: Vec<String>,
        invalid_fields: Vec<FieldViolation>,
    ) -> Self {
        Self {
            stage,
            missing_fields,
            invalid_fields,
        }
    }
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|violation| format!("{}: {}", violation.field, violation.reason))
        .collect::<Vec<_>>()
        .join("; ")
}
