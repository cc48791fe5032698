//! Toolchain execution.
//!
//! Runs an [`Invocation`](crate::invocation::Invocation) as a child process,
//! streaming its output into an [`OutputSink`] and resolving success from the
//! exit code. There is no retry, timeout or cancellation: once spawned, the
//! process runs to completion.

pub mod runner;
pub mod sink;
pub mod types;

pub use runner::run_invocation;
pub use sink::{CollectingSink, OutputSink, TracingSink};
pub use types::{ExecuteConfig, ExecuteError, RunOutcome};
