//! Task configuration.
//!
//! A task file declares named targets. Each target resolves to a
//! [`BuildConfiguration`]: its source globs, its destination directory and the
//! merged [`EmccOptions`] that drive the emcc command line.
//!
//! # Submodules
//!
//! - [`load`] - task file parsing and option merging
//! - `types` - option and configuration types

pub mod load;
mod types;

pub use load::{ConfigError, TaskFile, merge_options};
pub use types::*;
