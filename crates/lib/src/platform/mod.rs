pub mod arch;
pub mod os;
pub mod paths;

use arch::Arch;
use os::Os;
use std::fmt;

use thiserror::Error;

/// Errors raised while interpreting platform identifiers.
#[derive(Debug, Error)]
pub enum PlatformError {
  #[error("unrecognized operating system: {0}")]
  UnknownOs(String),

  #[error("unrecognized architecture: {0}")]
  UnknownArch(String),

  #[error("host platform is not supported: {os}/{arch}")]
  UnsupportedHost { os: String, arch: String },
}

/// Platform identifier combining architecture and OS (e.g., "x86_64-Linux")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
  pub arch: Arch,
  pub os: Os,
}

impl Platform {
  /// Create a new platform identifier
  pub fn new(arch: Arch, os: Os) -> Self {
    Self { arch, os }
  }

  /// Detect the current platform at runtime
  ///
  /// Returns `None` if the OS or architecture is not supported
  pub fn current() -> Option<Self> {
    Some(Self {
      arch: Arch::current()?,
      os: Os::current()?,
    })
  }

  /// Like [`Platform::current`], but reports what the host is when unsupported.
  pub fn detect() -> Result<Self, PlatformError> {
    Self::current().ok_or_else(|| PlatformError::UnsupportedHost {
      os: std::env::consts::OS.to_string(),
      arch: std::env::consts::ARCH.to_string(),
    })
  }

  /// Returns the platform triple string (e.g., "armv8-Macos")
  pub fn triple(&self) -> String {
    format!("{}-{}", self.arch, self.os)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.triple())
  }
}

/// Returns the platform triple for the current system
///
/// Returns `None` if the current platform is not supported
pub fn platform_triple() -> Option<String> {
  Platform::current().map(|p| p.triple())
}
