//! Schema validation for submitted stage artifacts.
//!
//! Schemas are declared per stage; rules collect every violation before the
//! submission is rejected. Validation never touches task state.

mod rules;
mod service;

pub use service::ArtifactValidator;
