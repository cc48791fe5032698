//! Types for running the toolchain.

use thiserror::Error;

/// Errors that prevent a toolchain run from completing.
///
/// A toolchain that runs and exits non-zero is not an error; it is reported
/// through [`RunOutcome::success`].
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The shell could not be started.
  #[error("failed to spawn {shell}: {source}")]
  Spawn {
    shell: String,
    #[source]
    source: std::io::Error,
  },

  /// Reading the child's output failed.
  #[error("failed to read command output: {0}")]
  Stream(#[source] std::io::Error),

  /// Waiting for the child to exit failed.
  #[error("failed to wait for command: {0}")]
  Wait(#[source] std::io::Error),
}

/// How a finished toolchain run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
  /// True only for exit code 0.
  pub success: bool,
  /// Exit code, `None` when the process was killed by a signal.
  pub code: Option<i32>,
}

/// Process execution settings.
#[derive(Debug, Clone, Default)]
pub struct ExecuteConfig {
  /// Shell to run the command line with.
  /// If None, uses /bin/sh (Unix) or powershell.exe (Windows).
  pub shell: Option<String>,

  /// Start the child from an empty environment instead of inheriting ours.
  /// Only the invocation's own variables are set.
  pub clear_env: bool,
}
