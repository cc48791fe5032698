//! emcc command line construction.
//!
//! [`build_invocation`] turns a [`BuildConfiguration`] into the exact token
//! list handed to the shell. Tokens are emitted in a fixed order because some
//! emcc flags are cumulative or order sensitive:
//!
//! 1. the output flag, always first
//! 2. simple flags (`--closure`, `-O`, `-g`, `--llvm-opts`, `--llvm-lto`,
//!    `--jcache`, `--memory-init-file`)
//! 3. `-s KEY=VALUE` settings, in the order they were written
//! 4. include paths
//! 5. source files
//!
//! Unset options produce no token at all. Values are not validated; emcc is
//! the one that rejects a bad flag. Path-valued tokens are shell-quoted when
//! they contain anything beyond plain path characters, since the tokens are
//! joined with spaces and run through a shell.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::config::BuildConfiguration;
use crate::consts::LLVM_ENV_VAR;
use crate::expand::ExpandedInputs;
use crate::util::path::{absolutize, shell_quote, to_token};

/// A fully materialised emcc invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
  /// The configured emcc command, verbatim.
  pub program: String,
  /// Argument tokens. A token may hold a flag and its value separated by a
  /// space, since the command line is handed to a shell as one string.
  pub args: Vec<String>,
  /// Variables set for the child on top of its base environment.
  pub env: BTreeMap<String, String>,
}

impl Invocation {
  /// The space-joined command line passed to the shell.
  pub fn command_line(&self) -> String {
    std::iter::once(self.program.as_str())
      .chain(self.args.iter().map(String::as_str))
      .collect::<Vec<_>>()
      .join(" ")
  }
}

/// Build the emcc invocation for one target.
///
/// # Arguments
///
/// * `config` - The target's merged configuration
/// * `inputs` - Include paths and sources already expanded from their globs
/// * `output` - Scratch path emcc writes the script to; must end in `.js`
/// * `cwd` - Directory relative paths are resolved against
pub fn build_invocation(config: &BuildConfiguration, inputs: &ExpandedInputs, output: &Path, cwd: &Path) -> Invocation {
  let options = &config.options;
  let mut args = Vec::new();

  args.push(format!("-o {}", shell_quote(&to_token(&absolutize(cwd, output)))));

  if let Some(closure) = &options.closure {
    args.push(format!("--closure {}", if closure.is_truthy() { 1 } else { 0 }));
  }

  if let Some(level) = &options.o {
    args.push(format!("-O{}", level));
  }

  if let Some(debug) = &options.g {
    if debug.is_number() {
      args.push(format!("-g{}", debug));
    } else if debug.is_truthy() {
      args.push("-g".to_string());
    }
  }

  if let Some(passes) = &options.llvm_opts {
    args.push(format!("--llvm-opts {}", passes));
  }

  if let Some(lto) = &options.llvm_lto {
    args.push(format!("--llvm-lto {}", lto));
  }

  if options.jcache {
    args.push("--jcache".to_string());
  }

  if options.memory_init_file {
    args.push("--memory-init-file 1".to_string());
  }

  for (key, value) in &options.compiler_options {
    args.push(setting_token(key, value));
  }

  for include in &inputs.include_paths {
    args.push(format!("-I{}", shell_quote(&to_token(include))));
  }

  for source in &inputs.sources {
    args.push(shell_quote(&to_token(&absolutize(cwd, source))));
  }

  let mut env = BTreeMap::new();
  if let Some(llvm) = options.llvm_dir() {
    env.insert(LLVM_ENV_VAR.to_string(), to_token(&absolutize(cwd, llvm)));
  }

  Invocation {
    program: options.emcc.clone(),
    args,
    env,
  }
}

/// Render one `-s` setting: the value as compact JSON with its quotes
/// escaped, the whole `KEY=VALUE` pair double-quoted for the shell.
fn setting_token(key: &str, value: &Value) -> String {
  let safe_value = value.to_string().replace('"', "\\\"");
  format!("-s \"{}={}\"", key, safe_value)
}
