mod build;
mod list;
mod show;

use anyhow::{Context, Result};

use embuild_lib::config::{BuildConfiguration, TaskFile};

pub use build::{BuildArgs, cmd_build};
pub use list::cmd_list;
pub use show::cmd_show;

/// Resolve the named targets, or every target in file order when none are named.
fn select_targets(task_file: &TaskFile, names: &[String]) -> Result<Vec<BuildConfiguration>> {
  if names.is_empty() {
    return task_file.targets().context("Failed to read targets");
  }

  names
    .iter()
    .map(|name| {
      task_file
        .target(name)
        .with_context(|| format!("Failed to read target '{}'", name))
    })
    .collect()
}

/// Replace the emcc executable of a target when an override is given.
fn override_emcc(config: &mut BuildConfiguration, emcc: Option<&str>) {
  if let Some(emcc) = emcc {
    config.options.emcc = emcc.to_string();
  }
}
