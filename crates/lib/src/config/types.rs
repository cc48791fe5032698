use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::consts::{DEFAULT_EMCC, DEFAULT_LLVM};

/// A loosely typed option value, as written in the task file.
///
/// Several emcc options accept either a number or a string (`-O2`, `-Os`), so
/// they are kept as the scalar the user wrote and rendered verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
  Bool(bool),
  Int(i64),
  Float(f64),
  Text(String),
}

impl Scalar {
  /// `false`, `0`, `NaN` and the empty string are falsy; everything else is truthy.
  pub fn is_truthy(&self) -> bool {
    match self {
      Scalar::Bool(b) => *b,
      Scalar::Int(n) => *n != 0,
      Scalar::Float(f) => *f != 0.0 && !f.is_nan(),
      Scalar::Text(s) => !s.is_empty(),
    }
  }

  pub fn is_number(&self) -> bool {
    matches!(self, Scalar::Int(_) | Scalar::Float(_))
  }
}

impl fmt::Display for Scalar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Scalar::Bool(b) => write!(f, "{}", b),
      Scalar::Int(n) => write!(f, "{}", n),
      Scalar::Float(n) => write!(f, "{}", n),
      Scalar::Text(s) => f.write_str(s),
    }
  }
}

impl From<i64> for Scalar {
  fn from(value: i64) -> Self {
    Scalar::Int(value)
  }
}

impl From<bool> for Scalar {
  fn from(value: bool) -> Self {
    Scalar::Bool(value)
  }
}

impl From<&str> for Scalar {
  fn from(value: &str) -> Self {
    Scalar::Text(value.to_string())
  }
}

/// emcc options after defaults, task-level and target-level settings have
/// been merged.
///
/// Every `Option` field that is `None` is left off the command line entirely
/// so emcc applies its own default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmccOptions {
  /// emcc executable. A bare name is resolved through `PATH` by the shell.
  #[serde(default = "default_emcc")]
  pub emcc: String,

  /// LLVM binaries directory exported to emcc. `null` or `""` unsets it.
  #[serde(default = "default_llvm")]
  pub llvm: Option<String>,

  #[serde(default, deserialize_with = "one_or_many")]
  pub include_paths: Vec<String>,

  #[serde(default)]
  pub closure: Option<Scalar>,

  #[serde(default)]
  pub o: Option<Scalar>,

  #[serde(default)]
  pub g: Option<Scalar>,

  #[serde(default)]
  pub llvm_opts: Option<Scalar>,

  #[serde(default)]
  pub llvm_lto: Option<Scalar>,

  #[serde(default)]
  pub jcache: bool,

  #[serde(default = "default_true")]
  pub memory_init_file: bool,

  /// Free-form `-s KEY=VALUE` settings, kept in the order they were written.
  #[serde(default)]
  pub compiler_options: Map<String, Value>,

  /// Delete destination artifacts that the latest build did not produce.
  ///
  /// Only correct when every build regenerates every artifact it wants to
  /// keep; turn it off for incremental toolchain setups.
  #[serde(default = "default_true")]
  pub prune_stale: bool,
}

impl Default for EmccOptions {
  fn default() -> Self {
    Self {
      emcc: default_emcc(),
      llvm: default_llvm(),
      include_paths: Vec::new(),
      closure: None,
      o: None,
      g: None,
      llvm_opts: None,
      llvm_lto: None,
      jcache: false,
      memory_init_file: true,
      compiler_options: Map::new(),
      prune_stale: true,
    }
  }
}

impl EmccOptions {
  /// The LLVM directory, treating an empty string as unset.
  pub fn llvm_dir(&self) -> Option<&str> {
    self.llvm.as_deref().filter(|dir| !dir.is_empty())
  }
}

/// Everything needed to build one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildConfiguration {
  /// Target name, also the base name of every output file.
  pub name: String,
  /// Source file globs.
  pub srcs: Vec<String>,
  /// Destination directory for the relocated artifacts.
  pub dest: String,
  pub options: EmccOptions,
}

impl BuildConfiguration {
  pub fn new(name: impl Into<String>, srcs: Vec<String>, dest: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      srcs,
      dest: dest.into(),
      options: EmccOptions::default(),
    }
  }

  pub fn with_options(mut self, options: EmccOptions) -> Self {
    self.options = options;
    self
  }
}

fn default_emcc() -> String {
  DEFAULT_EMCC.to_string()
}

fn default_llvm() -> Option<String> {
  Some(DEFAULT_LLVM.to_string())
}

fn default_true() -> bool {
  true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
  One(String),
  Many(Vec<String>),
}

/// Accept a single pattern, a list of patterns or `null`. An empty string
/// means no patterns.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
    None => Vec::new(),
    Some(OneOrMany::One(pattern)) if pattern.is_empty() => Vec::new(),
    Some(OneOrMany::One(pattern)) => vec![pattern],
    Some(OneOrMany::Many(patterns)) => patterns,
  })
}
