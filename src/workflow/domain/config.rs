//! Workflow configuration injected at engine construction.
//!
//! The configuration is an explicit value handed to the engine; there is no
//! ambient global. Parsing configuration files is the embedding process's
//! concern.

use super::{PipelineConfigError, PipelinePlan, StageToggle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_MAX_THINKING_TIME: Duration = Duration::from_secs(300);

/// Enable flag and defaults for one AI model provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderToggle {
    /// Provider name as the embedding process knows it.
    pub name: String,
    /// Whether the provider may be used.
    pub enabled: bool,
    /// Default model for this provider, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl ProviderToggle {
    /// Creates a provider toggle.
    #[must_use]
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            enabled,
            default_model: None,
        }
    }

    /// Sets the provider's default model.
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }
}

/// Issue-tracker integration hooks.
///
/// The registry may trigger these side effects but never observes or depends
/// on them for correctness.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackerHooksConfig {
    /// Tracker status to transition to when the pipeline starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_on_start: Option<String>,
    /// Tracker status to transition to when the pipeline completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_on_complete: Option<String>,
    /// Whether the tracker's status field is updated at all.
    #[serde(default)]
    pub update_status_field: bool,
}

/// External configuration surface of the workflow engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Whether submissions pass through the AI self-review gate.
    pub enable_ai_review: bool,
    /// Whether submissions require human approval.
    pub require_human_approval: bool,
    /// Whether the embedding process creates a work branch per task.
    pub auto_create_branches: bool,
    /// How long an external reasoning step may run before the embedding
    /// process treats it as stalled. The core enforces no timer.
    pub max_thinking_time: Duration,
    /// Ordered pipeline stages with enable flags.
    pub stages: Vec<StageToggle>,
    /// AI model providers.
    #[serde(default)]
    pub providers: Vec<ProviderToggle>,
    /// Issue-tracker integration hooks.
    #[serde(default)]
    pub tracker: TrackerHooksConfig,
    /// Glob-like pattern matching local task files (single `*` wildcard).
    pub task_file_pattern: String,
}

impl WorkflowConfig {
    /// Builds the pipeline plan from the configured stage toggles.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineConfigError`] when the stage list is malformed.
    pub fn pipeline_plan(&self) -> Result<PipelinePlan, PipelineConfigError> {
        PipelinePlan::new(self.stages.iter().copied())
    }

    /// Disables the AI self-review gate.
    #[must_use]
    pub const fn without_ai_review(mut self) -> Self {
        self.enable_ai_review = false;
        self
    }

    /// Disables the human approval gate.
    #[must_use]
    pub const fn without_human_approval(mut self) -> Self {
        self.require_human_approval = false;
        self
    }

    /// Replaces the stage toggles.
    #[must_use]
    pub fn with_stages(mut self, stages: impl IntoIterator<Item = StageToggle>) -> Self {
        self.stages = stages.into_iter().collect();
        self
    }

    /// Replaces the tracker hook settings.
    #[must_use]
    pub fn with_tracker(mut self, tracker: TrackerHooksConfig) -> Self {
        self.tracker = tracker;
        self
    }
}

impl Default for WorkflowConfig {
    /// Every stage enabled, both review gates active.
    fn default() -> Self {
        Self {
            enable_ai_review: true,
            require_human_approval: true,
            auto_create_branches: false,
            max_thinking_time: DEFAULT_MAX_THINKING_TIME,
            stages: PipelinePlan::all_enabled().entries().to_vec(),
            providers: Vec::new(),
            tracker: TrackerHooksConfig::default(),
            task_file_pattern: "TASK-*.json".to_owned(),
        }
    }
}
