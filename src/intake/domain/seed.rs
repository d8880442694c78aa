//! External task data as loaded from a source, before pipeline admission.

use crate::workflow::domain::{TaskKey, TaskSourceKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Task data fetched from an external source.
///
/// A seed carries everything the pipeline needs to admit a task; the intake
/// service turns it into a positioned work task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSeed {
    /// Externally assigned task identifier.
    pub task_id: TaskKey,
    /// Task title.
    pub title: String,
    /// Full task description.
    #[serde(default)]
    pub description: String,
    /// Ordered acceptance criteria.
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    /// Which external system produced the task. Local task files may omit
    /// this; it defaults to `local_file`.
    #[serde(default = "default_source")]
    pub source: TaskSourceKind,
    /// Reference into the source system (issue key, file name), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Initial cross-stage context notes.
    #[serde(default)]
    pub context: BTreeMap<String, Value>,
}

const fn default_source() -> TaskSourceKind {
    TaskSourceKind::LocalFile
}

impl TaskSeed {
    /// Creates a seed with the required fields.
    #[must_use]
    pub fn new(task_id: TaskKey, title: impl Into<String>, source: TaskSourceKind) -> Self {
        Self {
            task_id,
            title: title.into(),
            description: String::new(),
            acceptance_criteria: Vec::new(),
            source,
            reference: None,
            context: BTreeMap::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the acceptance criteria.
    #[must_use]
    pub fn with_acceptance_criteria(
        mut self,
        criteria: impl IntoIterator<Item = String>,
    ) -> Self {
        self.acceptance_criteria = criteria.into_iter().collect();
        self
    }

    /// Sets the source reference.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}
