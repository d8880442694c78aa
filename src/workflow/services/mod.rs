//! Orchestration services for the workflow state machine.

mod engine;
mod gate;

pub use engine::{
    EngineParts, ReviewOutcome, SubmissionOutcome, WorkflowEngine, WorkflowError, WorkflowResult,
};
pub use gate::{GateAdvance, ReviewGate};
