//! Directory-backed snapshot store over a filesystem capability.
//!
//! Layout: one subdirectory per task key, one zero-padded
//! `<sequence>.json` file per snapshot. Sequences are dense from 1 by the
//! store contract, so history is read by probing successive file names
//! rather than listing the directory.

use crate::workflow::domain::{SequenceNumber, TaskKey, TaskSnapshot};
use crate::workflow::ports::{SnapshotStore, SnapshotStoreError, SnapshotStoreResult};
use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

/// Snapshot store persisting JSON files under a capability directory.
#[derive(Debug)]
pub struct DirSnapshotStore {
    root: Dir,
}

impl DirSnapshotStore {
    /// Creates a store rooted at an already-opened capability directory.
    #[must_use]
    pub const fn new(root: Dir) -> Self {
        Self { root }
    }

    /// Opens a store rooted at `path` using ambient authority.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the directory cannot be
    /// opened.
    pub fn open_ambient(path: &str) -> std::io::Result<Self> {
        Dir::open_ambient_dir(path, ambient_authority()).map(Self::new)
    }

    fn task_dir_name(task: &TaskKey) -> SnapshotStoreResult<&str> {
        let name = task.as_str();
        if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
            return Err(SnapshotStoreError::storage(std::io::Error::other(format!(
                "task key '{name}' is not a valid directory name"
            ))));
        }
        Ok(name)
    }

    fn file_name(sequence: SequenceNumber) -> String {
        format!("{:010}.json", sequence.value())
    }

    /// Reads every stored snapshot of the task in sequence order.
    fn read_history(&self, task: &TaskKey) -> SnapshotStoreResult<Vec<TaskSnapshot>> {
        let dir_name = Self::task_dir_name(task)?;
        let dir = match self.root.open_dir(dir_name) {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(SnapshotStoreError::storage(err)),
        };

        let mut history = Vec::new();
        let mut sequence = SequenceNumber::first();
        loop {
            let contents = match dir.read_to_string(Self::file_name(sequence)) {
                Ok(contents) => contents,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => break,
                Err(err) => return Err(SnapshotStoreError::storage(err)),
            };
            let snapshot: TaskSnapshot =
                serde_json::from_str(&contents).map_err(SnapshotStoreError::storage)?;
            history.push(snapshot);
            sequence = sequence.next();
        }
        Ok(history)
    }
}

#[async_trait]
impl SnapshotStore for DirSnapshotStore {
    async fn append(&self, snapshot: TaskSnapshot) -> SnapshotStoreResult<()> {
        let dir_name = Self::task_dir_name(&snapshot.task_key)?.to_owned();
        self.root
            .create_dir_all(&dir_name)
            .map_err(SnapshotStoreError::storage)?;

        let history = self.read_history(&snapshot.task_key)?;
        let expected = history
            .last()
            .map_or_else(SequenceNumber::first, |last| last.sequence.next());
        if snapshot.sequence != expected {
            let latest = history
                .last()
                .map_or(SequenceNumber::new(0), |last| last.sequence);
            return Err(SnapshotStoreError::SequenceConflict {
                task: snapshot.task_key.clone(),
                appended: snapshot.sequence,
                latest,
            });
        }

        let dir = self
            .root
            .open_dir(&dir_name)
            .map_err(SnapshotStoreError::storage)?;
        let contents =
            serde_json::to_vec_pretty(&snapshot).map_err(SnapshotStoreError::storage)?;
        dir.write(Self::file_name(snapshot.sequence), contents)
            .map_err(SnapshotStoreError::storage)?;
        Ok(())
    }

    async fn latest(&self, task: &TaskKey) -> SnapshotStoreResult<Option<TaskSnapshot>> {
        Ok(self.read_history(task)?.into_iter().next_back())
    }

    async fn history(&self, task: &TaskKey) -> SnapshotStoreResult<Vec<TaskSnapshot>> {
        self.read_history(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::domain::{
        NewWorkTask, Stage, StagePosition, SubState, TaskOrigin, TaskSourceKind, WorkTask,
    };
    use mockable::DefaultClock;
    use std::collections::BTreeMap;

    fn open_store(dir: &tempfile::TempDir) -> DirSnapshotStore {
        let path = dir.path().to_str().expect("UTF-8 temp path");
        DirSnapshotStore::open_ambient(path).expect("store should open")
    }

    fn task(key: &str) -> WorkTask {
        WorkTask::new(
            NewWorkTask {
                key: TaskKey::new(key).expect("valid key"),
                title: "persist me".to_owned(),
                description: String::new(),
                acceptance_criteria: Vec::new(),
                origin: TaskOrigin::new(TaskSourceKind::LocalFile),
                position: StagePosition::new(Stage::Requirements, SubState::Dispatching),
                context: BTreeMap::new(),
            },
            &DefaultClock,
        )
        .expect("valid task")
    }

    #[tokio::test]
    async fn snapshots_survive_a_store_reopen() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let original = task("TASK-11");
        let snapshot = TaskSnapshot::capture(&original, &DefaultClock);
        let key = snapshot.task_key.clone();

        open_store(&tmp).append(snapshot.clone()).await.expect("append");

        let reopened = open_store(&tmp);
        let restored = reopened
            .latest(&key)
            .await
            .expect("latest")
            .expect("snapshot should exist");
        assert_eq!(restored, snapshot);
        assert_eq!(restored.state, original);
    }

    #[tokio::test]
    async fn sequences_append_densely() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let store = open_store(&tmp);
        let mut current = task("TASK-12");
        let key = current.key().clone();

        store
            .append(TaskSnapshot::capture(&current, &DefaultClock))
            .await
            .expect("first append");
        current.bump_revision();
        store
            .append(TaskSnapshot::capture(&current, &DefaultClock))
            .await
            .expect("second append");

        let history = store.history(&key).await.expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history.first().map(|s| s.sequence), Some(SequenceNumber::new(1)));
        assert_eq!(history.last().map(|s| s.sequence), Some(SequenceNumber::new(2)));
    }

    #[tokio::test]
    async fn stale_sequence_is_a_conflict() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let store = open_store(&tmp);
        let current = task("TASK-13");

        let snapshot = TaskSnapshot::capture(&current, &DefaultClock);
        store.append(snapshot.clone()).await.expect("append");
        let result = store.append(snapshot).await;
        assert!(matches!(
            result,
            Err(SnapshotStoreError::SequenceConflict { .. })
        ));
    }

    #[tokio::test]
    async fn path_escaping_task_keys_are_rejected() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let store = open_store(&tmp);
        let mut snapshot = TaskSnapshot::capture(&task("legit"), &DefaultClock);
        snapshot.task_key = TaskKey::new("../escape").expect("valid key");
        let result = store.append(snapshot).await;
        assert!(matches!(result, Err(SnapshotStoreError::Storage(_))));
    }
}
