//! Scratch directories for toolchain output.
//!
//! emcc writes into a scratch directory first because its output path must
//! end in `.js`, while the destination name is up to the caller. Every run
//! gets its own freshly created directory, so parallel runs never collide and
//! nothing else lives in it. The directory is owned by the caller once
//! allocated; the relocation step removes it.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::consts::APP_NAME;

/// Hands out a newly created, empty directory for one toolchain run.
pub trait ScratchProvider {
  fn allocate(&self) -> io::Result<PathBuf>;
}

fn fresh_dir_in(base: &Path, prefix: &str) -> io::Result<PathBuf> {
  let dir = tempfile::Builder::new().prefix(prefix).tempdir_in(base)?.keep();
  debug!(path = %dir.display(), "allocated scratch directory");
  Ok(dir)
}

/// Allocates a uniquely named directory under the system temp directory.
#[derive(Debug, Clone)]
pub struct TempScratch {
  prefix: String,
}

impl TempScratch {
  pub fn new() -> Self {
    Self {
      prefix: format!("{}-", APP_NAME),
    }
  }
}

impl Default for TempScratch {
  fn default() -> Self {
    Self::new()
  }
}

impl ScratchProvider for TempScratch {
  fn allocate(&self) -> io::Result<PathBuf> {
    fresh_dir_in(&std::env::temp_dir(), &self.prefix)
  }
}

/// Allocates under a caller-chosen base directory.
///
/// The base is created if missing and never handed out itself: each run gets
/// a new `embuild-*` subdirectory, so pointing the base at a directory with
/// other contents (the project, a destination) is harmless.
#[derive(Debug, Clone)]
pub struct FixedScratch {
  base: PathBuf,
  prefix: String,
}

impl FixedScratch {
  pub fn new(base: impl Into<PathBuf>) -> Self {
    Self {
      base: base.into(),
      prefix: format!("{}-", APP_NAME),
    }
  }
}

impl ScratchProvider for FixedScratch {
  fn allocate(&self) -> io::Result<PathBuf> {
    std::fs::create_dir_all(&self.base)?;
    fresh_dir_in(&self.base, &self.prefix)
  }
}
