//! Toolchain process execution.
//!
//! The invocation is joined into one command line and handed to a shell, so
//! any token that needs quoting must already carry its quotes. Output is
//! streamed line by line to an [`OutputSink`] while the process runs.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, error};

use crate::execute::sink::OutputSink;
use crate::execute::types::{ExecuteConfig, ExecuteError, RunOutcome};
use crate::invocation::Invocation;

/// Run an invocation to completion.
///
/// stdout lines go to [`OutputSink::stdout`] and stderr lines to
/// [`OutputSink::stderr`] as soon as they are read. This only returns once both
/// streams have been drained *and* the process has exited, so trailing output
/// is never lost.
///
/// # Arguments
///
/// * `invocation` - The command and extra environment to run
/// * `cwd` - Working directory for the child
/// * `config` - Shell and environment settings
/// * `sink` - Receiver for streamed output
///
/// # Returns
///
/// The outcome of the run. A non-zero exit is `Ok` with `success: false`;
/// `Err` means the process could not be run or observed at all.
pub async fn run_invocation(
  invocation: &Invocation,
  cwd: &Path,
  config: &ExecuteConfig,
  sink: &dyn OutputSink,
) -> Result<RunOutcome, ExecuteError> {
  let command_line = invocation.command_line();
  let (shell_cmd, shell_args) = get_shell(config.shell.as_deref());

  debug!(command = %command_line, "running");
  debug!("expecting exit code 0");

  let mut command = Command::new(&shell_cmd);
  command
    .args(&shell_args)
    .arg(&command_line)
    .current_dir(cwd)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());

  if config.clear_env {
    command.env_clear();
  }
  command.envs(&invocation.env);

  debug!(shell = %shell_cmd, working_dir = ?cwd, "spawning process");

  let mut child = command.spawn().map_err(|source| ExecuteError::Spawn {
    shell: shell_cmd.clone(),
    source,
  })?;

  let stdout = child.stdout.take();
  let stderr = child.stderr.take();

  let (stdout_result, stderr_result, status) = tokio::join!(
    drain_lines(stdout, |line| sink.stdout(line)),
    drain_lines(stderr, |line| sink.stderr(line)),
    child.wait()
  );

  stdout_result.map_err(ExecuteError::Stream)?;
  stderr_result.map_err(ExecuteError::Stream)?;
  let status = status.map_err(ExecuteError::Wait)?;

  let code = status.code();
  let success = code == Some(0);

  if success {
    debug!("exited with code 0");
  } else {
    match code {
      Some(code) => error!(code, "exited with code {}", code),
      None => error!("terminated by signal"),
    }
  }

  Ok(RunOutcome { success, code })
}

/// Read `stream` to the end, handing each line to `emit` without its line
/// terminator.
async fn drain_lines<R, F>(stream: Option<R>, mut emit: F) -> std::io::Result<()>
where
  R: AsyncRead + Unpin,
  F: FnMut(&str),
{
  let Some(stream) = stream else {
    return Ok(());
  };

  let mut reader = BufReader::new(stream);
  let mut buf = Vec::new();

  loop {
    buf.clear();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
      return Ok(());
    }
    let line = String::from_utf8_lossy(&buf);
    emit(line.trim_end_matches(['\r', '\n']));
  }
}

/// How a shell expects to be handed a command string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShellKind {
  Posix,
  PowerShell,
  Cmd,
}

impl ShellKind {
  /// Classify a shell by its program name; anything unrecognised is POSIX.
  fn of(program: &str) -> Self {
    let name = Path::new(program)
      .file_stem()
      .map(|stem| stem.to_string_lossy().to_ascii_lowercase())
      .unwrap_or_default();
    match name.as_str() {
      "powershell" | "pwsh" => ShellKind::PowerShell,
      "cmd" => ShellKind::Cmd,
      _ => ShellKind::Posix,
    }
  }

  /// Flags placed before the command string.
  fn command_flags(self) -> &'static [&'static str] {
    match self {
      ShellKind::Posix => &["-c"],
      ShellKind::PowerShell => &["-NoProfile", "-ExecutionPolicy", "Bypass", "-Command"],
      ShellKind::Cmd => &["/C"],
    }
  }
}

/// The shell program and its leading flags: the configured override, or
/// `/bin/sh` (never `$SHELL`, which may source user profiles) on Unix and
/// PowerShell on Windows.
fn get_shell(override_shell: Option<&str>) -> (String, Vec<String>) {
  let program = match override_shell {
    Some(shell) => shell,
    None if cfg!(windows) => "powershell.exe",
    None => "/bin/sh",
  };
  let flags = ShellKind::of(program)
    .command_flags()
    .iter()
    .map(|flag| flag.to_string())
    .collect();
  (program.to_string(), flags)
}
