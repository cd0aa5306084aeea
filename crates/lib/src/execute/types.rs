//! Types for running external build tools.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while running an external command.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The program could not be started (not installed, not executable, ...).
  #[error("failed to start {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// Command ran and exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed {
    cmd: String,
    code: Option<i32>,
    stderr: String,
  },

  /// Working directory for the command does not exist.
  #[error("working directory does not exist: {0}")]
  MissingWorkdir(PathBuf),

  /// I/O error during execution.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl ExecuteError {
  /// Trailing stderr of a failed command, if any was captured.
  pub fn stderr_tail(&self, lines: usize) -> Option<String> {
    match self {
      Self::CmdFailed { stderr, .. } if !stderr.trim().is_empty() => {
        let all: Vec<&str> = stderr.lines().collect();
        let start = all.len().saturating_sub(lines);
        Some(all[start..].join("\n"))
      }
      _ => None,
    }
  }
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
  pub stdout: String,
  pub stderr: String,
}
