//! Review gate participants and audit records.

use super::Stage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Which reviewer acts at a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerKind {
    /// The automated self-review gate.
    Ai,
    /// The human approval gate.
    Human,
}

impl ReviewerKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Human => "human",
        }
    }
}

impl fmt::Display for ReviewerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One gate attempt, preserved for audit.
///
/// Feedback is present exactly when the attempt rejected the artifact, and
/// is stored verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Unique identifier for this record.
    pub record_id: Uuid,
    /// The stage whose artifact was reviewed.
    pub stage: Stage,
    /// Who reviewed.
    pub reviewer: ReviewerKind,
    /// Whether the artifact passed the gate.
    pub approved: bool,
    /// Rejection feedback, verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// When the review was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl ReviewRecord {
    /// Records an approval.
    #[must_use]
    pub fn approval(stage: Stage, reviewer: ReviewerKind, clock: &impl mockable::Clock) -> Self {
        Self {
            record_id: Uuid::new_v4(),
            stage,
            reviewer,
            approved: true,
            feedback: None,
            recorded_at: clock.utc(),
        }
    }

    /// Records a rejection with its feedback.
    #[must_use]
    pub fn rejection(
        stage: Stage,
        reviewer: ReviewerKind,
        feedback: impl Into<String>,
        clock: &impl mockable::Clock,
    ) -> Self {
        Self {
            record_id: Uuid::new_v4(),
            stage,
            reviewer,
            approved: false,
            feedback: Some(feedback.into()),
            recorded_at: clock.utc(),
        }
    }
}
