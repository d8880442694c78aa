//! Orchestration services for task intake.

mod registry;

pub use registry::{IntakeError, IntakeResult, TaskIntakeService};
