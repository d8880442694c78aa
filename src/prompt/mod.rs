//! Instruction-text resolution for acting agents.
//!
//! Templates are registered in a catalog and resolved through a fixed
//! three-level lookup: (stage, sub-state), shared sub-state, fixed fallback.
//! Rendering happens behind a narrow capability port; the shipped adapter is
//! backed by `minijinja`. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
