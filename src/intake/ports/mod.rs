//! Port contracts for task intake.

pub mod source;

pub use source::{TaskSource, TaskSourceError, TaskSourceResult};
