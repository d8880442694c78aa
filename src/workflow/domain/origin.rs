//! Task origin: which external system a task was loaded from.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The closed set of external systems a task can originate from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSourceKind {
    /// A task file in the configured local directory.
    LocalFile,
    /// A GitHub issue.
    Github,
    /// A Jira ticket.
    Jira,
    /// A Linear issue.
    Linear,
}

impl TaskSourceKind {
    /// All supported source kinds.
    pub const ALL: [Self; 4] = [Self::LocalFile, Self::Github, Self::Jira, Self::Linear];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LocalFile => "local_file",
            Self::Github => "github",
            Self::Jira => "jira",
            Self::Linear => "linear",
        }
    }
}

impl fmt::Display for TaskSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for TaskSourceKind {
    type Error = ParseTaskSourceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "local_file" => Ok(Self::LocalFile),
            "github" => Ok(Self::Github),
            "jira" => Ok(Self::Jira),
            "linear" => Ok(Self::Linear),
            _ => Err(ParseTaskSourceError(value.to_owned())),
        }
    }
}

/// Error returned while parsing task source kinds.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task source: {0}")]
pub struct ParseTaskSourceError(pub String);

/// Origin information persisted with each task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOrigin {
    /// Which external system produced the task.
    pub source: TaskSourceKind,
    /// Reference into the source system (issue key, file name), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl TaskOrigin {
    /// Creates an origin without an external reference.
    #[must_use]
    pub const fn new(source: TaskSourceKind) -> Self {
        Self {
            source,
            reference: None,
        }
    }

    /// Sets the external reference.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}
