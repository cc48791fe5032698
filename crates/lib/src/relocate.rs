//! Moving toolchain output from scratch into the destination.
//!
//! A build produces up to three artifacts: the script (`.js`), the memory
//! initialisation blob (`.js.mem`) and the source map (`.js.map`). Each is
//! reconciled independently:
//!
//! - present in scratch: copied to the destination (through an optional
//!   [`Transform`]) and deleted from scratch
//! - absent from scratch but present in the destination: the stale copy is
//!   deleted, unless stale pruning is off
//! - absent from both: nothing happens
//!
//! The scratch directory is removed afterwards whatever happened, including
//! when one of the steps above failed. Removal is not recursive: only the
//! three artifact files are deleted, and a directory still holding anything
//! else is left in place with a warning.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::consts::SCRIPT_EXT;

/// A pure rewrite applied to an artifact's bytes while it is copied.
pub type Transform = Box<dyn Fn(&[u8]) -> Vec<u8> + Send + Sync>;

#[derive(Debug, Error)]
pub enum RelocateError {
  #[error("failed to create destination directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to remove {path}: {source}")]
  Remove {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to remove scratch directory {path}: {source}")]
  RemoveScratch {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
  Script,
  MemoryInit,
  SourceMap,
}

impl ArtifactKind {
  pub const ALL: [ArtifactKind; 3] = [ArtifactKind::Script, ArtifactKind::MemoryInit, ArtifactKind::SourceMap];

  /// File name suffix after the target name.
  pub fn suffix(self) -> &'static str {
    match self {
      ArtifactKind::Script => ".js",
      ArtifactKind::MemoryInit => ".js.mem",
      ArtifactKind::SourceMap => ".js.map",
    }
  }
}

impl fmt::Display for ArtifactKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      ArtifactKind::Script => "script",
      ArtifactKind::MemoryInit => "memory init file",
      ArtifactKind::SourceMap => "source map",
    })
  }
}

/// One output file: where emcc writes it and where it ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
  pub kind: ArtifactKind,
  pub scratch: PathBuf,
  pub dest: PathBuf,
}

/// The three artifacts of one target's build.
#[derive(Debug, Clone)]
pub struct ArtifactSet {
  scratch_dir: PathBuf,
  dest_dir: PathBuf,
  artifacts: [Artifact; 3],
}

impl ArtifactSet {
  pub fn new(scratch_dir: &Path, dest_dir: &Path, name: &str) -> Self {
    let dest_script = dest_dir.join(format!("{}{}", name, SCRIPT_EXT));
    let script_name = dest_script
      .file_name()
      .map(|n| n.to_os_string())
      .unwrap_or_else(|| OsString::from(SCRIPT_EXT));
    let scratch_script = scratch_dir.join(script_name);

    let artifacts = ArtifactKind::ALL.map(|kind| {
      let scratch = match kind {
        ArtifactKind::Script => scratch_script.clone(),
        ArtifactKind::MemoryInit => with_suffix(&scratch_script, ".mem"),
        ArtifactKind::SourceMap => with_suffix(&scratch_script, ".map"),
      };
      Artifact {
        kind,
        scratch,
        dest: dest_dir.join(format!("{}{}", name, kind.suffix())),
      }
    });

    Self {
      scratch_dir: scratch_dir.to_path_buf(),
      dest_dir: dest_dir.to_path_buf(),
      artifacts,
    }
  }

  /// The path handed to emcc's `-o`.
  pub fn script_output(&self) -> &Path {
    &self.artifacts[0].scratch
  }

  pub fn scratch_dir(&self) -> &Path {
    &self.scratch_dir
  }

  pub fn dest_dir(&self) -> &Path {
    &self.dest_dir
  }

  pub fn get(&self, kind: ArtifactKind) -> &Artifact {
    &self.artifacts[kind as usize]
  }

  pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
    self.artifacts.iter()
  }
}

/// What happened to one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relocation {
  /// Copied from scratch into the destination.
  Copied,
  /// Not produced; the old destination copy was deleted.
  RemovedStale,
  /// Not produced; the old destination copy was left in place.
  KeptStale,
  /// Not produced and not present in the destination.
  Absent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocateReport {
  pub entries: Vec<(ArtifactKind, Relocation)>,
}

impl RelocateReport {
  pub fn get(&self, kind: ArtifactKind) -> Option<Relocation> {
    self.entries.iter().find(|(k, _)| *k == kind).map(|(_, r)| *r)
  }

  /// Kinds that were copied into the destination.
  pub fn copied(&self) -> impl Iterator<Item = ArtifactKind> + '_ {
    self
      .entries
      .iter()
      .filter(|(_, r)| *r == Relocation::Copied)
      .map(|(k, _)| *k)
  }
}

/// Reconcile the scratch output of one build with its destination, then
/// remove the scratch directory.
///
/// # Arguments
///
/// * `set` - The artifacts of the build
/// * `cwd` - Working directory whose absolute path is stripped from text artifacts
/// * `prune_stale` - Delete destination artifacts that were not produced this time
pub fn relocate(set: &ArtifactSet, cwd: &Path, prune_stale: bool) -> Result<RelocateReport, RelocateError> {
  let result = relocate_artifacts(set, cwd, prune_stale);
  let cleanup = remove_scratch(set);

  let report = result?;
  cleanup?;
  Ok(report)
}

fn relocate_artifacts(set: &ArtifactSet, cwd: &Path, prune_stale: bool) -> Result<RelocateReport, RelocateError> {
  fs::create_dir_all(set.dest_dir()).map_err(|source| RelocateError::CreateDir {
    path: set.dest_dir().to_path_buf(),
    source,
  })?;

  let mut report = RelocateReport::default();
  for artifact in set.iter() {
    let transform = transform_for(artifact.kind, cwd, set.scratch_dir());
    let relocation = copy_if_exists(artifact, transform.as_ref(), prune_stale)?;
    report.entries.push((artifact.kind, relocation));
  }

  Ok(report)
}

/// Path rewriting for each artifact kind.
///
/// The script loses the working directory prefix; the source map loses the
/// scratch directory prefix and then the working directory. The memory init blob is
/// copied verbatim. A working directory at the filesystem root is never
/// stripped, since its prefix would match every separator.
pub fn transform_for(kind: ArtifactKind, cwd: &Path, scratch_dir: &Path) -> Option<Transform> {
  let strip_cwd = cwd.parent().is_some();
  match kind {
    ArtifactKind::Script if strip_cwd => Some(strip_all(vec![dir_prefix(cwd)])),
    ArtifactKind::Script => None,
    ArtifactKind::SourceMap => {
      // Scratch first: it may live inside the working directory.
      let mut needles = vec![dir_prefix(scratch_dir)];
      if strip_cwd {
        needles.push(cwd.to_string_lossy().into_owned());
      }
      Some(strip_all(needles))
    }
    ArtifactKind::MemoryInit => None,
  }
}

/// Remove every occurrence of each needle, applying the needles in order.
pub fn strip_all<S: Into<Vec<u8>>>(needles: Vec<S>) -> Transform {
  let needles: Vec<Vec<u8>> = needles.into_iter().map(Into::into).collect();
  Box::new(move |input: &[u8]| {
    needles
      .iter()
      .fold(input.to_vec(), |acc, needle| strip_bytes(&acc, needle))
  })
}

/// Copy one artifact into place, or clean up after it when it was not
/// produced.
pub fn copy_if_exists(
  artifact: &Artifact,
  transform: Option<&Transform>,
  prune_stale: bool,
) -> Result<Relocation, RelocateError> {
  if artifact.scratch.exists() {
    let contents = fs::read(&artifact.scratch).map_err(|source| RelocateError::Read {
      path: artifact.scratch.clone(),
      source,
    })?;
    let contents = match transform {
      Some(transform) => transform(&contents),
      None => contents,
    };
    fs::write(&artifact.dest, contents).map_err(|source| RelocateError::Write {
      path: artifact.dest.clone(),
      source,
    })?;
    fs::remove_file(&artifact.scratch).map_err(|source| RelocateError::Remove {
      path: artifact.scratch.clone(),
      source,
    })?;

    debug!(kind = %artifact.kind, dest = %artifact.dest.display(), "copied artifact");
    Ok(Relocation::Copied)
  } else if artifact.dest.exists() {
    if !prune_stale {
      debug!(kind = %artifact.kind, dest = %artifact.dest.display(), "keeping stale artifact");
      return Ok(Relocation::KeptStale);
    }
    fs::remove_file(&artifact.dest).map_err(|source| RelocateError::Remove {
      path: artifact.dest.clone(),
      source,
    })?;

    info!(kind = %artifact.kind, dest = %artifact.dest.display(), "removed stale artifact");
    Ok(Relocation::RemovedStale)
  } else {
    Ok(Relocation::Absent)
  }
}

fn remove_scratch(set: &ArtifactSet) -> Result<(), RelocateError> {
  for artifact in set.iter() {
    match fs::remove_file(&artifact.scratch) {
      Ok(()) => {}
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(source) => {
        return Err(RelocateError::RemoveScratch {
          path: artifact.scratch.clone(),
          source,
        });
      }
    }
  }

  let dir = set.scratch_dir();
  match fs::remove_dir(dir) {
    Ok(()) => {
      debug!(path = %dir.display(), "removed scratch directory");
      Ok(())
    }
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
    Err(e) if e.kind() == std::io::ErrorKind::DirectoryNotEmpty => {
      warn!(path = %dir.display(), "scratch directory holds unexpected files, leaving it in place");
      Ok(())
    }
    Err(source) => Err(RelocateError::RemoveScratch {
      path: dir.to_path_buf(),
      source,
    }),
  }
}

/// The directory's path with exactly one trailing separator.
fn dir_prefix(dir: &Path) -> String {
  let mut prefix = dir.to_string_lossy().into_owned();
  if !prefix.ends_with(std::path::MAIN_SEPARATOR) {
    prefix.push(std::path::MAIN_SEPARATOR);
  }
  prefix
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
  let mut name = path.as_os_str().to_os_string();
  name.push(suffix);
  PathBuf::from(name)
}

fn strip_bytes(haystack: &[u8], needle: &[u8]) -> Vec<u8> {
  if needle.is_empty() {
    return haystack.to_vec();
  }

  let mut out = Vec::with_capacity(haystack.len());
  let mut i = 0;
  while i < haystack.len() {
    if haystack[i..].starts_with(needle) {
      i += needle.len();
    } else {
      out.push(haystack[i]);
      i += 1;
    }
  }
  out
}
