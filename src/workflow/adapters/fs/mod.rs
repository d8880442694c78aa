//! Filesystem adapter implementations over `cap-std` capabilities.

mod snapshot_store;

pub use snapshot_store::DirSnapshotStore;
