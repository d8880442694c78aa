//! Renderer port: the single narrow capability the core needs from a
//! template engine.

use serde_json::Value;
use thiserror::Error;

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Renders a template body against a JSON context.
///
/// The core depends only on the variable contract below, never on a
/// specific template syntax. Implementations must:
///
/// - substitute an empty value for missing or null variables, including
///   nested-field access, without raising;
/// - support direct key lookup, nested-field access, default values, list
///   iteration, and conditional inclusion;
/// - provide a `tojson` filter rendering a variable as structured JSON.
pub trait TemplateRenderer: Send + Sync {
    /// Renders `template` with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the template body itself is malformed.
    fn render(&self, template: &str, context: &Value) -> RenderResult<String>;
}

/// Error returned by renderer implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("template rendering failed: {0}")]
pub struct RenderError(pub String);
