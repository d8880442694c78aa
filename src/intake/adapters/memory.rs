//! In-memory task source for tests and embedded use.

use crate::intake::domain::TaskSeed;
use crate::intake::ports::{TaskSource, TaskSourceError, TaskSourceResult};
use crate::workflow::domain::TaskKey;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory task source.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskSource {
    seeds: Arc<RwLock<HashMap<TaskKey, TaskSeed>>>,
}

impl InMemoryTaskSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a seed to the source.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSourceError::Io`] when the backing lock is poisoned.
    pub fn insert(&self, seed: TaskSeed) -> TaskSourceResult<()> {
        let mut seeds = self
            .seeds
            .write()
            .map_err(|err| TaskSourceError::io(std::io::Error::other(err.to_string())))?;
        seeds.insert(seed.task_id.clone(), seed);
        Ok(())
    }
}

#[async_trait]
impl TaskSource for InMemoryTaskSource {
    async fn fetch(&self, key: &TaskKey) -> TaskSourceResult<Option<TaskSeed>> {
        let seeds = self
            .seeds
            .read()
            .map_err(|err| TaskSourceError::io(std::io::Error::other(err.to_string())))?;
        Ok(seeds.get(key).cloned())
    }
}
