//! Implementation of the `embuild show` command.

use std::path::Path;

use anyhow::{Context, Result};

use embuild_lib::config::TaskFile;
use embuild_lib::consts::APP_NAME;
use embuild_lib::task::plan_target;

use super::override_emcc;
use crate::output::{OutputFormat, print_json};

/// Print the command a target would run, without running it.
///
/// The scratch directory shown is a placeholder; `build` allocates a fresh one.
pub fn cmd_show(file: &Path, target: &str, emcc: Option<String>, output: OutputFormat) -> Result<()> {
  let cwd = std::env::current_dir().context("Failed to determine working directory")?;
  let task_file = TaskFile::load(file).with_context(|| format!("Failed to load task file: {}", file.display()))?;

  let mut config = task_file
    .target(target)
    .with_context(|| format!("Failed to read target '{}'", target))?;
  override_emcc(&mut config, emcc.as_deref());

  let scratch_dir = std::env::temp_dir().join(format!("{}-scratch", APP_NAME));
  let invocation =
    plan_target(&config, &cwd, &scratch_dir).with_context(|| format!("Failed to plan target '{}'", target))?;

  if output.is_json() {
    return print_json(&invocation);
  }

  for (key, value) in &invocation.env {
    println!("{}={}", key, value);
  }
  println!("{}", invocation.command_line());

  Ok(())
}
