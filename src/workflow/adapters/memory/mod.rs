//! In-memory adapter implementations.

mod snapshot_store;

pub use snapshot_store::InMemorySnapshotStore;
