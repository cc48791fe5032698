//! Destinations for streamed child output.

use std::sync::{Mutex, MutexGuard};

use tracing::{error, info};

/// Receives the toolchain's output one line at a time, as it arrives.
///
/// Lines have their trailing newline removed. Invalid UTF-8 is replaced.
pub trait OutputSink: Sync {
  fn stdout(&self, line: &str);
  fn stderr(&self, line: &str);
}

/// Forwards stdout to `info` and stderr to `error` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl OutputSink for TracingSink {
  fn stdout(&self, line: &str) {
    info!("{}", line);
  }

  fn stderr(&self, line: &str) {
    error!("{}", line);
  }
}

/// Keeps every line in memory, stdout and stderr apart, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
  stdout: Mutex<Vec<String>>,
  stderr: Mutex<Vec<String>>,
}

impl CollectingSink {
  pub fn stdout_lines(&self) -> Vec<String> {
    lock(&self.stdout).clone()
  }

  pub fn stderr_lines(&self) -> Vec<String> {
    lock(&self.stderr).clone()
  }
}

impl OutputSink for CollectingSink {
  fn stdout(&self, line: &str) {
    lock(&self.stdout).push(line.to_string());
  }

  fn stderr(&self, line: &str) {
    lock(&self.stderr).push(line.to_string());
  }
}

// A panicking sink user must not take the collected output with it.
fn lock(lines: &Mutex<Vec<String>>) -> MutexGuard<'_, Vec<String>> {
  lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
