//! Adapter implementations of the workflow ports.

pub mod fs;
pub mod memory;
