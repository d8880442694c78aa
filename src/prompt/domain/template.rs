//! Instruction templates and resolution results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An instruction-text template in the renderer's syntax.
///
/// The core treats the body as opaque: only the renderer interprets it, and
/// only against the documented variable contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptTemplate(String);

impl PromptTemplate {
    /// Creates a template from its body.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    /// Returns the template body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PromptTemplate {
    fn from(body: &str) -> Self {
        Self::new(body)
    }
}

/// Which lookup level produced an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionSource {
    /// A template registered for the exact (stage, sub-state) pair.
    Stage,
    /// A shared template registered for the sub-state alone.
    Shared,
    /// The fixed not-found template; signals a configuration gap.
    Fallback,
}

impl fmt::Display for InstructionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stage => "stage",
            Self::Shared => "shared",
            Self::Fallback => "fallback",
        };
        write!(f, "{name}")
    }
}

/// The instruction text handed to the acting agent, tagged with its lookup
/// level so callers can distinguish a real instruction from the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedInstruction {
    text: String,
    source: InstructionSource,
}

impl ResolvedInstruction {
    /// Creates a resolved instruction.
    #[must_use]
    pub const fn new(text: String, source: InstructionSource) -> Self {
        Self { text, source }
    }

    /// Returns the instruction text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the lookup level that produced the text.
    #[must_use]
    pub const fn source(&self) -> InstructionSource {
        self.source
    }

    /// Returns `true` when no template was registered for the requested
    /// combination and the fixed fallback was used instead.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self.source, InstructionSource::Fallback)
    }

    /// Consumes the instruction, returning its text.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}
