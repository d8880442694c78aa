//! Unit tests for the workflow services.
