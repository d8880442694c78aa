//! Pipeline stages and per-stage sub-states.
//!
//! `Stage` declaration order is the canonical pipeline order; the derived
//! `Ord` implementation relies on it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One phase of the fixed delivery pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Requirements intake.
    Requirements,
    /// Specification authoring.
    Spec,
    /// Breakdown of the spec into subtasks.
    TaskBreakdown,
    /// Implementation planning.
    Planning,
    /// Implementation of the planned work.
    Implementation,
    /// Code review of the implementation.
    Review,
    /// Test authoring and execution.
    Testing,
    /// Commit, pull request, and hand-off.
    Finalize,
}

impl Stage {
    /// All stages in canonical pipeline order.
    pub const ORDER: [Self; 8] = [
        Self::Requirements,
        Self::Spec,
        Self::TaskBreakdown,
        Self::Planning,
        Self::Implementation,
        Self::Review,
        Self::Testing,
        Self::Finalize,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requirements => "requirements",
            Self::Spec => "spec",
            Self::TaskBreakdown => "task_breakdown",
            Self::Planning => "planning",
            Self::Implementation => "implementation",
            Self::Review => "review",
            Self::Testing => "testing",
            Self::Finalize => "finalize",
        }
    }

    /// Returns `true` when the stage opens with a preliminary check before
    /// its producing sub-state.
    ///
    /// Implementation is the only stage with one: a git working-tree check
    /// whose artifact follows the `GitStatus` schema and passes no review
    /// gate.
    #[must_use]
    pub const fn has_preliminary(self) -> bool {
        matches!(self, Self::Implementation)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Stage {
    type Error = ParseStageError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "requirements" => Ok(Self::Requirements),
            "spec" => Ok(Self::Spec),
            "task_breakdown" => Ok(Self::TaskBreakdown),
            "planning" => Ok(Self::Planning),
            "implementation" => Ok(Self::Implementation),
            "review" => Ok(Self::Review),
            "testing" => Ok(Self::Testing),
            "finalize" => Ok(Self::Finalize),
            _ => Err(ParseStageError(value.to_owned())),
        }
    }
}

/// Error returned while parsing stage names from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown stage: {0}")]
pub struct ParseStageError(pub String);

/// Position within a stage's local protocol.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SubState {
    /// Stage-specific check preceding `dispatching`; no review gate.
    Preliminary,
    /// The stage is producing its artifact.
    Dispatching,
    /// A submitted artifact awaits the AI review gate.
    AwaitingAiReview,
    /// A submitted artifact awaits the human review gate.
    AwaitingHumanReview,
    /// The stage's artifact has been accepted.
    Accepted,
}

impl SubState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preliminary => "preliminary",
            Self::Dispatching => "dispatching",
            Self::AwaitingAiReview => "awaiting_ai_review",
            Self::AwaitingHumanReview => "awaiting_human_review",
            Self::Accepted => "accepted",
        }
    }

    /// Returns `true` when a submission is accepted in this sub-state.
    #[must_use]
    pub const fn is_producing(self) -> bool {
        matches!(self, Self::Preliminary | Self::Dispatching)
    }

    /// Returns `true` when the sub-state is a review gate.
    #[must_use]
    pub const fn is_gate(self) -> bool {
        matches!(self, Self::AwaitingAiReview | Self::AwaitingHumanReview)
    }
}

impl fmt::Display for SubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for SubState {
    type Error = ParseSubStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "preliminary" => Ok(Self::Preliminary),
            "dispatching" => Ok(Self::Dispatching),
            "awaiting_ai_review" => Ok(Self::AwaitingAiReview),
            "awaiting_human_review" => Ok(Self::AwaitingHumanReview),
            "accepted" => Ok(Self::Accepted),
            _ => Err(ParseSubStateError(value.to_owned())),
        }
    }
}

/// Error returned while parsing sub-state names from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown sub-state: {0}")]
pub struct ParseSubStateError(pub String);

/// The single active (stage, sub-state) pair of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StagePosition {
    /// Active pipeline stage.
    pub stage: Stage,
    /// Position within the stage's local protocol.
    pub sub_state: SubState,
}

impl StagePosition {
    /// Creates a position.
    #[must_use]
    pub const fn new(stage: Stage, sub_state: SubState) -> Self {
        Self { stage, sub_state }
    }
}

impl fmt::Display for StagePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.stage, self.sub_state)
    }
}
