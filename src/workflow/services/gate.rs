//! The two-gate review protocol layered over the stage sub-states.
//!
//! Submission enters the first enabled gate; the AI gate filters obvious
//! defects before human attention is spent, and the human gate retains final
//! authority. Either gate may reject, which always rewinds to `dispatching`
//! of the same stage. Both gates are independently toggleable: disabling the
//! AI gate removes `awaiting_ai_review` from the chain entirely, and
//! disabling human approval makes acceptance automatic once it is reached.

use crate::workflow::domain::{ReviewerKind, SubState, WorkflowConfig};

/// What an approval at a gate leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAdvance {
    /// The artifact moves on to the human gate.
    ToHumanGate,
    /// The stage is accepted and the task auto-advances.
    StageAccepted,
}

/// Derives gate transitions from the configured review toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewGate {
    enable_ai_review: bool,
    require_human_approval: bool,
}

impl ReviewGate {
    /// Creates a gate chain from explicit toggles.
    #[must_use]
    pub const fn new(enable_ai_review: bool, require_human_approval: bool) -> Self {
        Self {
            enable_ai_review,
            require_human_approval,
        }
    }

    /// Creates the gate chain declared by the configuration.
    #[must_use]
    pub const fn from_config(config: &WorkflowConfig) -> Self {
        Self::new(config.enable_ai_review, config.require_human_approval)
    }

    /// Returns the sub-state a fresh submission enters: the first enabled
    /// gate, or `accepted` when both gates are disabled.
    #[must_use]
    pub const fn entry_sub_state(&self) -> SubState {
        if self.enable_ai_review {
            SubState::AwaitingAiReview
        } else if self.require_human_approval {
            SubState::AwaitingHumanReview
        } else {
            SubState::Accepted
        }
    }

    /// Returns the sub-state at which the given reviewer kind acts.
    #[must_use]
    pub const fn expected_sub_state(reviewer: ReviewerKind) -> SubState {
        match reviewer {
            ReviewerKind::Ai => SubState::AwaitingAiReview,
            ReviewerKind::Human => SubState::AwaitingHumanReview,
        }
    }

    /// Returns what an approval by the given reviewer leads to.
    #[must_use]
    pub const fn after_approval(&self, reviewer: ReviewerKind) -> GateAdvance {
        match reviewer {
            ReviewerKind::Ai => {
                if self.require_human_approval {
                    GateAdvance::ToHumanGate
                } else {
                    GateAdvance::StageAccepted
                }
            }
            ReviewerKind::Human => GateAdvance::StageAccepted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_gates_enabled_enters_the_ai_gate() {
        let gate = ReviewGate::new(true, true);
        assert_eq!(gate.entry_sub_state(), SubState::AwaitingAiReview);
        assert_eq!(gate.after_approval(ReviewerKind::Ai), GateAdvance::ToHumanGate);
        assert_eq!(
            gate.after_approval(ReviewerKind::Human),
            GateAdvance::StageAccepted
        );
    }

    #[test]
    fn disabled_ai_gate_enters_the_human_gate_directly() {
        let gate = ReviewGate::new(false, true);
        assert_eq!(gate.entry_sub_state(), SubState::AwaitingHumanReview);
    }

    #[test]
    fn disabled_human_gate_accepts_on_ai_approval() {
        let gate = ReviewGate::new(true, false);
        assert_eq!(gate.entry_sub_state(), SubState::AwaitingAiReview);
        assert_eq!(
            gate.after_approval(ReviewerKind::Ai),
            GateAdvance::StageAccepted
        );
    }

    #[test]
    fn both_gates_disabled_accepts_immediately() {
        let gate = ReviewGate::new(false, false);
        assert_eq!(gate.entry_sub_state(), SubState::Accepted);
    }
}
