//! Implementation of the `embuild list` command.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use embuild_lib::config::TaskFile;

use crate::output::{ARROW, OutputFormat, print_json};

#[derive(Serialize)]
struct TargetSummary {
  name: String,
  dest: String,
  srcs: Vec<String>,
}

pub fn cmd_list(file: &Path, output: OutputFormat) -> Result<()> {
  let task_file = TaskFile::load(file).with_context(|| format!("Failed to load task file: {}", file.display()))?;

  let summaries: Vec<TargetSummary> = task_file
    .targets()
    .context("Failed to read targets")?
    .into_iter()
    .map(|config| TargetSummary {
      name: config.name,
      dest: config.dest,
      srcs: config.srcs,
    })
    .collect();

  if output.is_json() {
    return print_json(&summaries);
  }

  if summaries.is_empty() {
    println!("No targets declared in {}", file.display());
    return Ok(());
  }

  for summary in &summaries {
    println!("{} {} {}", summary.name, ARROW, summary.dest);
    println!("  srcs: {}", summary.srcs.join(" "));
  }

  Ok(())
}
