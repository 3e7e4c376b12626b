//! Configuration model for changewise.
//!
//! This module defines the Config struct that represents `.changewise.yaml`
//! at the repository root. It supports forward-compatible YAML parsing
//! (unknown fields are ignored), defaults for every field, and validation.

mod model;
mod operations;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::{Config, CONFIG_FILE_NAME};
pub use operations::PathFilter;
