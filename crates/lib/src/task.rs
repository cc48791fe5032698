//! The build pipeline for one target.
//!
//! expand inputs → allocate scratch → build invocation → run emcc →
//! relocate artifacts. Relocation always runs once the scratch directory
//! exists, whether emcc succeeded, failed, or could not be started, so stale
//! outputs and the scratch directory are always cleaned up.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::BuildConfiguration;
use crate::execute::{ExecuteConfig, ExecuteError, OutputSink, run_invocation};
use crate::expand::{ExpandError, ExpandedInputs};
use crate::invocation::{Invocation, build_invocation};
use crate::relocate::{ArtifactSet, RelocateError, RelocateReport, relocate};
use crate::scratch::ScratchProvider;
use crate::util::path::absolutize;

#[derive(Debug, Error)]
pub enum TaskError {
  #[error(transparent)]
  Expand(#[from] ExpandError),

  #[error("failed to allocate scratch directory: {0}")]
  Scratch(#[source] io::Error),

  #[error(transparent)]
  Execute(#[from] ExecuteError),

  #[error(transparent)]
  Relocate(#[from] RelocateError),
}

/// Everything a target run needs from its host.
pub struct TaskContext<'a> {
  /// Directory that relative globs, sources and destinations resolve against.
  pub cwd: PathBuf,
  pub scratch: &'a dyn ScratchProvider,
  pub sink: &'a dyn OutputSink,
  pub execute: ExecuteConfig,
}

/// Result of building one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
  pub name: String,
  /// True only when emcc exited with code 0.
  pub success: bool,
  pub exit_code: Option<i32>,
  pub dest_dir: PathBuf,
  pub relocations: RelocateReport,
}

/// Build one target.
///
/// A failing emcc is reported through [`TaskOutcome::success`]. `Err` is
/// reserved for conditions that stop the pipeline itself: bad globs, an
/// unusable scratch directory, a process that cannot be spawned, or
/// filesystem errors while relocating.
pub async fn run_target(config: &BuildConfiguration, ctx: &TaskContext<'_>) -> Result<TaskOutcome, TaskError> {
  let inputs = ExpandedInputs::resolve(config, &ctx.cwd)?;
  if inputs.sources.is_empty() {
    warn!(name = %config.name, "no source files matched");
  }

  let scratch_dir = absolutize(&ctx.cwd, ctx.scratch.allocate().map_err(TaskError::Scratch)?);
  let dest_dir = absolutize(&ctx.cwd, &config.dest);
  let artifacts = ArtifactSet::new(&scratch_dir, &dest_dir, &config.name);
  let invocation = build_invocation(config, &inputs, artifacts.script_output(), &ctx.cwd);

  info!(
    name = %config.name,
    "running {} to build {}",
    config.options.emcc,
    Path::new(&config.dest).join(&config.name).display()
  );

  let run = run_invocation(&invocation, &ctx.cwd, &ctx.execute, ctx.sink).await;
  let relocations = relocate(&artifacts, &ctx.cwd, config.options.prune_stale);

  let outcome = run?;
  let relocations = relocations?;

  Ok(TaskOutcome {
    name: config.name.clone(),
    success: outcome.success,
    exit_code: outcome.code,
    dest_dir,
    relocations,
  })
}

/// The invocation [`run_target`] would execute, without running anything.
pub fn plan_target(config: &BuildConfiguration, cwd: &Path, scratch_dir: &Path) -> Result<Invocation, TaskError> {
  let inputs = ExpandedInputs::resolve(config, cwd)?;
  let dest_dir = absolutize(cwd, &config.dest);
  let artifacts = ArtifactSet::new(scratch_dir, &dest_dir, &config.name);
  Ok(build_invocation(config, &inputs, artifacts.script_output(), cwd))
}
