//! Port contracts for workflow persistence and external collaborators.

pub mod snapshot_store;
pub mod tracker;

pub use snapshot_store::{SnapshotStore, SnapshotStoreError, SnapshotStoreResult};
pub use tracker::{IssueTracker, NoopTracker, TrackerError, TrackerResult};
