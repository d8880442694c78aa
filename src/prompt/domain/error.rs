//! Error types for instruction resolution.

use crate::workflow::domain::{Stage, SubState};
use thiserror::Error;

/// Errors raised while resolving instruction text.
///
/// A missing template is deliberately not an error: resolution degrades to
/// the fixed fallback instruction instead, flagged via
/// [`super::InstructionSource::Fallback`]. Only a registered template that
/// fails to render surfaces here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PromptError {
    /// A registered template failed to render.
    #[error("template for ({stage}, {sub_state}) failed to render: {reason}")]
    Render {
        /// The stage whose template was rendered.
        stage: Stage,
        /// The sub-state whose template was rendered.
        sub_state: SubState,
        /// Renderer-supplied failure reason.
        reason: String,
    },

    /// The render context could not be assembled from the task.
    #[error("render context could not be built: {0}")]
    Context(String),
}
