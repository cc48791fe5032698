//! Shared utilities.
//!
//! Path normalisation and test helpers used across the crate.

pub mod path;
