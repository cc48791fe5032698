//! Task file loading and option merging.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::types::{BuildConfiguration, EmccOptions, one_or_many};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read task file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse task file: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("invalid configuration for target '{name}': {source}")]
  InvalidTarget {
    name: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("unknown target '{0}'")]
  UnknownTarget(String),
}

/// A target as written in the task file, before option merging.
#[derive(Debug, Clone, Deserialize)]
struct RawTarget {
  #[serde(default, deserialize_with = "one_or_many")]
  srcs: Vec<String>,
  dest: String,
  #[serde(default)]
  options: Map<String, Value>,
}

/// The parsed task file.
///
/// ```json
/// {
///   "options": { "o": 2, "includePaths": ["include/"] },
///   "targets": {
///     "hello": { "srcs": ["src/*.c"], "dest": "build/", "options": { "g": 4 } }
///   }
/// }
/// ```
///
/// Options are merged shallowly: built-in defaults, then the task-level
/// `options`, then the target's own `options`. Targets keep the order they
/// appear in the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFile {
  #[serde(default)]
  options: Map<String, Value>,
  #[serde(default)]
  targets: Map<String, Value>,
}

impl TaskFile {
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    debug!(path = %path.display(), "loaded task file");
    Self::parse(&content)
  }

  pub fn parse(content: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(content)?)
  }

  /// Target names in file order.
  pub fn target_names(&self) -> impl Iterator<Item = &str> {
    self.targets.keys().map(|name| name.as_str())
  }

  /// Resolve every target, in file order.
  pub fn targets(&self) -> Result<Vec<BuildConfiguration>, ConfigError> {
    self.targets.iter().map(|(name, raw)| self.resolve(name, raw)).collect()
  }

  pub fn target(&self, name: &str) -> Result<BuildConfiguration, ConfigError> {
    let raw = self
      .targets
      .get(name)
      .ok_or_else(|| ConfigError::UnknownTarget(name.to_string()))?;
    self.resolve(name, raw)
  }

  fn resolve(&self, name: &str, raw: &Value) -> Result<BuildConfiguration, ConfigError> {
    let invalid = |source| ConfigError::InvalidTarget {
      name: name.to_string(),
      source,
    };

    let target: RawTarget = serde_json::from_value(raw.clone()).map_err(invalid)?;
    let options = merge_options(&self.options, &target.options).map_err(invalid)?;

    Ok(BuildConfiguration {
      name: name.to_string(),
      srcs: target.srcs,
      dest: target.dest,
      options,
    })
  }
}

/// Layer target-level options over task-level ones and fill the rest from
/// the defaults. Keys are replaced wholesale, nested objects are not merged.
pub fn merge_options(task: &Map<String, Value>, target: &Map<String, Value>) -> Result<EmccOptions, serde_json::Error> {
  let mut merged = task.clone();
  for (key, value) in target {
    merged.insert(key.clone(), value.clone());
  }
  serde_json::from_value(Value::Object(merged))
}
