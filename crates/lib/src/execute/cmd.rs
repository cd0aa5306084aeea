//! Running external commands.
//!
//! Build tools need the caller's toolchain, so unlike a sandboxed action the
//! inherited environment is kept; extra variables are layered on top.

use std::collections::BTreeMap;
use std::path::Path;

use tokio::process::Command;
use tracing::{debug, info};

use super::types::{CommandOutput, ExecuteError};

/// Render a program and its arguments as one display string.
pub fn display_command(program: &str, args: &[String]) -> String {
  std::iter::once(program)
    .chain(args.iter().map(String::as_str))
    .map(|part| {
      if part.is_empty() || part.contains(char::is_whitespace) {
        format!("\"{}\"", part)
      } else {
        part.to_string()
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

/// Run `program` with `args` in `cwd` and wait for it to finish.
///
/// # Arguments
///
/// * `program` - Program name (looked up in `PATH`) or path
/// * `args` - Arguments, passed without shell interpretation
/// * `cwd` - Working directory; must exist
/// * `env` - Variables added to the inherited environment
///
/// # Returns
///
/// The captured stdout and stderr on a zero exit status.
pub async fn run_command(
  program: &str,
  args: &[String],
  cwd: &Path,
  env: &BTreeMap<String, String>,
) -> Result<CommandOutput, ExecuteError> {
  let cmd = display_command(program, args);
  info!(cmd = %cmd, cwd = %cwd.display(), "executing command");

  if !cwd.is_dir() {
    return Err(ExecuteError::MissingWorkdir(cwd.to_path_buf()));
  }

  let mut command = Command::new(program);
  command.args(args).current_dir(cwd).envs(env).kill_on_drop(true);

  let output = command.output().await.map_err(|source| ExecuteError::Spawn {
    program: program.to_string(),
    source,
  })?;

  let stdout = String::from_utf8_lossy(&output.stdout).to_string();
  let stderr = String::from_utf8_lossy(&output.stderr).to_string();

  if !stdout.is_empty() {
    debug!(stdout = %stdout.trim_end(), "command stdout");
  }
  if !stderr.is_empty() {
    debug!(stderr = %stderr.trim_end(), "command stderr");
  }

  if !output.status.success() {
    return Err(ExecuteError::CmdFailed {
      cmd,
      code: output.status.code(),
      stderr,
    });
  }

  Ok(CommandOutput { stdout, stderr })
}
