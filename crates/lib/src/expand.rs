//! Glob expansion for include paths and sources.
//!
//! Patterns are expanded in order. Each pattern appends the paths it matches
//! that have not been seen yet; a pattern starting with `!` removes whatever it
//! matches from the collected list. Relative patterns are matched against the
//! working directory and come back relative to it, absolute patterns come back
//! absolute. Patterns that match nothing contribute nothing.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::BuildConfiguration;

#[derive(Debug, Error)]
pub enum ExpandError {
  #[error("invalid glob pattern '{pattern}': {source}")]
  Pattern {
    pattern: String,
    #[source]
    source: glob::PatternError,
  },

  #[error("failed to read {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Include paths and sources of one target, expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedInputs {
  pub include_paths: Vec<PathBuf>,
  pub sources: Vec<PathBuf>,
}

impl ExpandedInputs {
  pub fn resolve(config: &BuildConfiguration, cwd: &Path) -> Result<Self, ExpandError> {
    let include_paths = expand_patterns(&config.options.include_paths, cwd)?;
    let sources = expand_patterns(&config.srcs, cwd)?;

    debug!(
      name = %config.name,
      include_paths = include_paths.len(),
      sources = sources.len(),
      "expanded inputs"
    );

    Ok(Self { include_paths, sources })
  }
}

pub fn expand_patterns<S: AsRef<str>>(patterns: &[S], cwd: &Path) -> Result<Vec<PathBuf>, ExpandError> {
  let mut matches: Vec<PathBuf> = Vec::new();

  for pattern in patterns {
    let pattern = pattern.as_ref();
    match pattern.strip_prefix('!') {
      Some(negated) => {
        let excluded = glob_one(negated, cwd)?;
        matches.retain(|path| !excluded.contains(path));
      }
      None => {
        for path in glob_one(pattern, cwd)? {
          if !matches.contains(&path) {
            matches.push(path);
          }
        }
      }
    }
  }

  Ok(matches)
}

fn glob_one(pattern: &str, cwd: &Path) -> Result<Vec<PathBuf>, ExpandError> {
  let absolute = Path::new(pattern).is_absolute();
  let full_pattern = if absolute {
    pattern.to_string()
  } else {
    let base = glob::Pattern::escape(&cwd.to_string_lossy());
    format!("{}/{}", base.trim_end_matches('/'), pattern)
  };

  let entries = glob::glob(&full_pattern).map_err(|source| ExpandError::Pattern {
    pattern: pattern.to_string(),
    source,
  })?;

  let mut paths = Vec::new();
  for entry in entries {
    let path = entry.map_err(|e| ExpandError::Io {
      path: e.path().to_path_buf(),
      source: e.into_error(),
    })?;
    let path = if absolute {
      path
    } else {
      path.strip_prefix(cwd).map(Path::to_path_buf).unwrap_or(path)
    };
    paths.push(path);
  }

  Ok(paths)
}
