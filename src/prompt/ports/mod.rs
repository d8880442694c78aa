//! Port contracts for instruction-text rendering.

pub mod renderer;

pub use renderer::{RenderError, RenderResult, TemplateRenderer};
