//! Task intake from external sources.
//!
//! Abstracts over where tasks originate (local task files matching a
//! configured pattern, or an external tracker) and builds the work task the
//! engine admits. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
