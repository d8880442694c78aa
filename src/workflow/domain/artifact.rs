//! Typed, per-stage artifact payloads.
//!
//! An artifact is immutable once accepted; rejected artifacts are discarded
//! and only the reviewer's feedback survives into the task context.

use super::{Stage, TaskSourceKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// The structured output of a stage, tagged by schema kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageArtifact {
    /// Requirements-intake artifact.
    Requirements(RequirementsArtifact),
    /// Specification artifact.
    Spec(SpecArtifact),
    /// Task-breakdown artifact.
    TaskBreakdown(TaskBreakdownArtifact),
    /// Planning artifact.
    Plan(PlanArtifact),
    /// Implementation manifest.
    Implementation(ImplementationManifest),
    /// Code-review artifact.
    Review(ReviewArtifact),
    /// Test-run artifact.
    TestResult(TestResultArtifact),
    /// Finalisation artifact.
    Finalize(FinalizeArtifact),
    /// Git working-tree check, produced by a preliminary sub-state.
    GitStatus(GitStatusArtifact),
}

impl StageArtifact {
    /// Returns the pipeline stage this artifact belongs to, or `None` for
    /// the preliminary-check artifact.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Requirements(_) => Some(Stage::Requirements),
            Self::Spec(_) => Some(Stage::Spec),
            Self::TaskBreakdown(_) => Some(Stage::TaskBreakdown),
            Self::Plan(_) => Some(Stage::Planning),
            Self::Implementation(_) => Some(Stage::Implementation),
            Self::Review(_) => Some(Stage::Review),
            Self::TestResult(_) => Some(Stage::Testing),
            Self::Finalize(_) => Some(Stage::Finalize),
            Self::GitStatus(_) => None,
        }
    }
}

/// Artifact of the requirements stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementsArtifact {
    /// One-line summary of the task.
    pub task_summary: String,
    /// Full task description.
    pub task_description: String,
    /// Ordered acceptance criteria.
    pub acceptance_criteria: Vec<String>,
    /// Which external system the task came from.
    pub task_source: TaskSourceKind,
    /// Free-form context gathered during intake.
    pub additional_context: String,
}

/// Artifact of the specification stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecArtifact {
    /// Completeness summary of the authored spec.
    pub spec_summary: String,
    /// Stage-specific free-form fields.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Artifact of the task-breakdown stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskBreakdownArtifact {
    /// Completeness summary of the breakdown.
    pub breakdown_summary: String,
    /// Subtasks derived from the spec.
    pub subtasks: Vec<String>,
    /// Stage-specific free-form fields.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Artifact of the planning stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanArtifact {
    /// Completeness summary of the plan.
    pub plan_summary: String,
    /// Ordered implementation steps.
    pub steps: Vec<String>,
    /// Stage-specific free-form fields.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Artifact of the implementation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplementationManifest {
    /// Completeness summary of the implemented work.
    pub summary: String,
    /// Subtasks completed during implementation.
    pub completed_subtasks: Vec<String>,
}

/// Artifact of the code-review stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewArtifact {
    /// Review summary.
    pub summary: String,
    /// Reviewer verdict on the reviewed change.
    pub approved: bool,
    /// Itemised review feedback.
    pub feedback: Vec<String>,
}

/// Outcome of a single executed test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseResult {
    /// Test name.
    pub name: String,
    /// Pass/fail status.
    pub status: TestStatus,
    /// Failure message, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Closed pass/fail status of a test case.
///
/// Any other literal is rejected at validation time rather than coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// The test passed.
    Passed,
    /// The test failed.
    Failed,
}

impl TestStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for TestStatus {
    type Error = ParseTestStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "passed" => Ok(Self::Passed),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseTestStatusError(value.to_owned())),
        }
    }
}

/// Error returned while parsing test statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown test status: {0}")]
pub struct ParseTestStatusError(pub String);

/// Artifact of the testing stage.
///
/// Accepted regardless of overall pass/fail: the review gates, not the
/// validator, judge whether failures block the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResultArtifact {
    /// Summary of the test run.
    pub test_summary: String,
    /// Names of the executed tests.
    pub tests_run: Vec<String>,
    /// Per-test outcomes.
    pub test_results: Vec<TestCaseResult>,
}

/// Artifact of the finalisation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizeArtifact {
    /// Hash of the final commit.
    pub commit_hash: String,
    /// URL of the opened pull request.
    pub pr_url: String,
}

/// Git working-tree check produced by the implementation stage's
/// preliminary sub-state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitStatusArtifact {
    /// Whether the working tree is clean.
    pub is_clean: bool,
    /// The currently checked-out branch.
    pub current_branch: String,
    /// Paths with uncommitted changes.
    pub uncommitted_changes: Vec<String>,
}
