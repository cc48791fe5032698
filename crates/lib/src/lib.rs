//! embuild-lib: Core types and logic for embuild
//!
//! This crate drives the Emscripten `emcc` toolchain for a set of declared
//! targets:
//! - `config`: task files, option merging and the per-target configuration
//! - `invocation`: turning a configuration into an emcc command line
//! - `execute`: running that command with streamed output
//! - `relocate`: moving artifacts from scratch into the destination
//! - `task`: the pipeline tying the steps together

pub mod config;
pub mod consts;
pub mod execute;
pub mod expand;
pub mod invocation;
pub mod relocate;
pub mod scratch;
pub mod task;
pub mod util;
