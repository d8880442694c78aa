//! The ordered pipeline table and enabled-stage lookups.

use super::{Stage, StagePosition, SubState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Enable flag for a single pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageToggle {
    /// The stage this toggle applies to.
    pub stage: Stage,
    /// Whether the pipeline visits the stage.
    pub enabled: bool,
}

impl StageToggle {
    /// Creates a toggle.
    #[must_use]
    pub const fn new(stage: Stage, enabled: bool) -> Self {
        Self { stage, enabled }
    }
}

/// Errors raised while building a pipeline plan from configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineConfigError {
    /// A stage appears more than once in the configured list.
    #[error("stage {0} is listed more than once")]
    DuplicateStage(Stage),

    /// The configured list breaks the canonical relative stage order.
    #[error("stage {0} is listed out of pipeline order")]
    OutOfOrder(Stage),

    /// Every stage in the configured list is disabled.
    #[error("pipeline has no enabled stages")]
    NoEnabledStages,
}

/// The fixed, externally configured pipeline: every stage in canonical
/// relative order, each with an enable flag.
///
/// Advancing a task always skips disabled stages; the plan is the single
/// source of truth for "the next enabled stage".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelinePlan {
    entries: Vec<StageToggle>,
}

impl PipelinePlan {
    /// Builds a plan from configured toggles.
    ///
    /// Stages omitted from `toggles` are treated as disabled. The list must
    /// respect canonical relative order and name each stage at most once.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineConfigError`] when the list repeats a stage, breaks
    /// the canonical order, or leaves no stage enabled.
    pub fn new(toggles: impl IntoIterator<Item = StageToggle>) -> Result<Self, PipelineConfigError> {
        let mut entries: Vec<StageToggle> = Vec::new();
        for toggle in toggles {
            if entries.iter().any(|entry| entry.stage == toggle.stage) {
                return Err(PipelineConfigError::DuplicateStage(toggle.stage));
            }
            if let Some(last) = entries.last()
                && last.stage > toggle.stage
            {
                return Err(PipelineConfigError::OutOfOrder(toggle.stage));
            }
            entries.push(toggle);
        }
        if !entries.iter().any(|entry| entry.enabled) {
            return Err(PipelineConfigError::NoEnabledStages);
        }
        Ok(Self { entries })
    }

    /// Builds the plan with every stage enabled.
    #[must_use]
    pub fn all_enabled() -> Self {
        Self {
            entries: Stage::ORDER
                .into_iter()
                .map(|stage| StageToggle::new(stage, true))
                .collect(),
        }
    }

    /// Returns the configured toggles in pipeline order.
    #[must_use]
    pub fn entries(&self) -> &[StageToggle] {
        &self.entries
    }

    /// Returns `true` when the pipeline visits the stage.
    #[must_use]
    pub fn is_enabled(&self, stage: Stage) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.stage == stage && entry.enabled)
    }

    /// Returns the first enabled stage of the pipeline.
    #[must_use]
    pub fn first_enabled(&self) -> Option<Stage> {
        self.entries
            .iter()
            .find(|entry| entry.enabled)
            .map(|entry| entry.stage)
    }

    /// Returns the next enabled stage strictly after `after`, skipping any
    /// disabled stages in between.
    #[must_use]
    pub fn next_enabled(&self, after: Stage) -> Option<Stage> {
        self.entries
            .iter()
            .filter(|entry| entry.enabled)
            .map(|entry| entry.stage)
            .find(|stage| *stage > after)
    }

    /// Returns the sub-state a task enters when it arrives at `stage`.
    #[must_use]
    pub fn initial_sub_state(&self, stage: Stage) -> SubState {
        if stage.has_preliminary() {
            SubState::Preliminary
        } else {
            SubState::Dispatching
        }
    }

    /// Returns the position a task occupies when it arrives at `stage`.
    #[must_use]
    pub fn entry_position(&self, stage: Stage) -> StagePosition {
        StagePosition::new(stage, self.initial_sub_state(stage))
    }
}

impl Default for PipelinePlan {
    fn default() -> Self {
        Self::all_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_enabled_visits_every_stage_in_order() {
        let plan = PipelinePlan::all_enabled();
        assert_eq!(plan.first_enabled(), Some(Stage::Requirements));
        assert_eq!(plan.next_enabled(Stage::Requirements), Some(Stage::Spec));
        assert_eq!(plan.next_enabled(Stage::Testing), Some(Stage::Finalize));
        assert_eq!(plan.next_enabled(Stage::Finalize), None);
    }

    #[test]
    fn next_enabled_skips_disabled_stages() {
        let plan = PipelinePlan::new([
            StageToggle::new(Stage::Implementation, true),
            StageToggle::new(Stage::Review, false),
            StageToggle::new(Stage::Testing, true),
        ])
        .expect("valid plan");
        assert_eq!(plan.next_enabled(Stage::Implementation), Some(Stage::Testing));
    }

    #[test]
    fn duplicate_stage_is_rejected() {
        let result = PipelinePlan::new([
            StageToggle::new(Stage::Spec, true),
            StageToggle::new(Stage::Spec, false),
        ]);
        assert_eq!(result, Err(PipelineConfigError::DuplicateStage(Stage::Spec)));
    }

    #[test]
    fn out_of_order_listing_is_rejected() {
        let result = PipelinePlan::new([
            StageToggle::new(Stage::Review, true),
            StageToggle::new(Stage::Planning, true),
        ]);
        assert_eq!(result, Err(PipelineConfigError::OutOfOrder(Stage::Planning)));
    }

    #[test]
    fn fully_disabled_pipeline_is_rejected() {
        let result = PipelinePlan::new([StageToggle::new(Stage::Spec, false)]);
        assert_eq!(result, Err(PipelineConfigError::NoEnabledStages));
    }

    #[test]
    fn implementation_enters_through_its_preliminary_check() {
        let plan = PipelinePlan::all_enabled();
        assert_eq!(
            plan.initial_sub_state(Stage::Implementation),
            SubState::Preliminary
        );
        assert_eq!(plan.initial_sub_state(Stage::Review), SubState::Dispatching);
    }
}
