//! Local-directory task source over a filesystem capability.
//!
//! Scans a capability directory for files matching the configured naming
//! pattern and parses each as a JSON task seed.

use crate::intake::domain::TaskSeed;
use crate::intake::ports::{TaskSource, TaskSourceError, TaskSourceResult};
use crate::workflow::domain::TaskKey;
use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

/// Task source reading JSON seed files from a directory.
#[derive(Debug)]
pub struct LocalDirTaskSource {
    dir: Dir,
    pattern: String,
}

impl LocalDirTaskSource {
    /// Creates a source over an already-opened capability directory.
    ///
    /// `pattern` is a file-name pattern with at most one `*` wildcard, as
    /// configured (for example `TASK-*.json`).
    #[must_use]
    pub fn new(dir: Dir, pattern: impl Into<String>) -> Self {
        Self {
            dir,
            pattern: pattern.into(),
        }
    }

    /// Opens a source rooted at `path` using ambient authority.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the directory cannot be
    /// opened.
    pub fn open_ambient(path: &str, pattern: impl Into<String>) -> std::io::Result<Self> {
        Dir::open_ambient_dir(path, ambient_authority()).map(|dir| Self::new(dir, pattern))
    }
}

/// Matches a file name against a pattern with at most one `*` wildcard.
fn matches_pattern(pattern: &str, name: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            name.len() >= prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
        }
        None => pattern == name,
    }
}

#[async_trait]
impl TaskSource for LocalDirTaskSource {
    async fn fetch(&self, key: &TaskKey) -> TaskSourceResult<Option<TaskSeed>> {
        let entries = self.dir.entries().map_err(TaskSourceError::io)?;
        for entry in entries {
            let entry = entry.map_err(TaskSourceError::io)?;
            let name = entry.file_name().map_err(TaskSourceError::io)?;
            if !matches_pattern(&self.pattern, &name) {
                continue;
            }
            let contents = self
                .dir
                .read_to_string(&name)
                .map_err(TaskSourceError::io)?;
            let mut seed: TaskSeed =
                serde_json::from_str(&contents).map_err(|error| TaskSourceError::Parse {
                    record: name.clone(),
                    reason: error.to_string(),
                })?;
            if seed.task_id == *key {
                if seed.reference.is_none() {
                    seed.reference = Some(name);
                }
                return Ok(Some(seed));
            }
        }
        Ok(None)
    }
}
