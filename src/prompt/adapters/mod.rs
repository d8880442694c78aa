//! Adapter implementations of the rendering port.

mod minijinja;

pub use minijinja::MiniJinjaRenderer;
