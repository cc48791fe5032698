//! Implementation of the `embuild build` command.
//!
//! Builds each selected target in turn: emcc writes into a scratch directory
//! and the artifacts are relocated into the target's destination.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::debug;

use embuild_lib::config::TaskFile;
use embuild_lib::execute::{ExecuteConfig, TracingSink};
use embuild_lib::scratch::{FixedScratch, ScratchProvider, TempScratch};
use embuild_lib::task::{TaskContext, run_target};
use embuild_lib::util::path::absolutize;

use super::{override_emcc, select_targets};
use crate::output::{ARROW, Status, format_duration, print_detail, print_status};

#[derive(Debug, Args)]
pub struct BuildArgs {
  /// Targets to build
  pub targets: Vec<String>,

  /// Override the emcc executable for every target
  #[arg(long)]
  pub emcc: Option<String>,

  /// Shell used to run emcc
  #[arg(long)]
  pub shell: Option<String>,

  /// Run emcc with only the environment variables embuild sets
  #[arg(long)]
  pub clear_env: bool,

  /// Base directory for emcc's scratch output, instead of the system temp
  /// directory. Each target gets its own subdirectory, removed afterwards.
  #[arg(long)]
  pub scratch_dir: Option<PathBuf>,
}

pub fn cmd_build(file: &Path, args: &BuildArgs) -> Result<()> {
  let cwd = std::env::current_dir().context("Failed to determine working directory")?;
  let task_file = TaskFile::load(file).with_context(|| format!("Failed to load task file: {}", file.display()))?;

  let mut targets = select_targets(&task_file, &args.targets)?;
  debug!(targets = targets.len(), "selected targets");
  if targets.is_empty() {
    print_status(Status::Warning, &format!("No targets declared in {}", file.display()));
    return Ok(());
  }
  for target in &mut targets {
    override_emcc(target, args.emcc.as_deref());
  }

  let scratch: Box<dyn ScratchProvider> = match &args.scratch_dir {
    Some(dir) => Box::new(FixedScratch::new(absolutize(&cwd, dir))),
    None => Box::new(TempScratch::new()),
  };
  let ctx = TaskContext {
    cwd,
    scratch: scratch.as_ref(),
    sink: &TracingSink,
    execute: ExecuteConfig {
      shell: args.shell.clone(),
      clear_env: args.clear_env,
    },
  };

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

  let mut failed = Vec::new();
  for target in &targets {
    let start = Instant::now();
    let outcome = rt
      .block_on(run_target(target, &ctx))
      .with_context(|| format!("Failed to build target '{}'", target.name))?;
    let elapsed = format_duration(start.elapsed());

    if outcome.success {
      print_status(Status::Success, &format!("{} built in {}", outcome.name, elapsed));
      for kind in outcome.relocations.copied() {
        let dest = outcome.dest_dir.join(format!("{}{}", outcome.name, kind.suffix()));
        print_detail(&kind.to_string(), &format!("{} {}", ARROW, dest.display()));
      }
    } else {
      let status = match outcome.exit_code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
      };
      print_status(Status::Failure, &format!("{} failed after {} ({})", outcome.name, elapsed, status));
      failed.push(outcome.name);
    }
  }

  if !failed.is_empty() {
    bail!("{} of {} target(s) failed: {}", failed.len(), targets.len(), failed.join(", "));
  }

  Ok(())
}
