//! Build settings: the target platform and build type a recipe is built for.
//!
//! Settings are not options. They describe the target rather than the
//! package and are supplied by the host, a profile, or `-s key=value`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::arch::Arch;
use crate::platform::os::Os;
use crate::platform::{Platform, PlatformError};

/// Errors raised while assembling settings.
#[derive(Debug, Error)]
pub enum SettingsError {
  #[error(transparent)]
  Platform(#[from] PlatformError),

  #[error("unknown setting '{0}' (expected os, arch or build_type)")]
  UnknownSetting(String),

  #[error("invalid setting assignment '{0}' (expected key=value)")]
  Malformed(String),

  #[error("unrecognized build type: {0}")]
  UnknownBuildType(String),
}

/// CMake build type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildType {
  #[default]
  Release,
  Debug,
  RelWithDebInfo,
  MinSizeRel,
}

impl BuildType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Release => "Release",
      Self::Debug => "Debug",
      Self::RelWithDebInfo => "RelWithDebInfo",
      Self::MinSizeRel => "MinSizeRel",
    }
  }
}

impl fmt::Display for BuildType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for BuildType {
  type Err = SettingsError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "release" => Ok(Self::Release),
      "debug" => Ok(Self::Debug),
      "relwithdebinfo" => Ok(Self::RelWithDebInfo),
      "minsizerel" => Ok(Self::MinSizeRel),
      _ => Err(SettingsError::UnknownBuildType(s.to_string())),
    }
  }
}

/// The settings one build is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Settings {
  pub os: Os,
  pub arch: Arch,
  pub build_type: BuildType,
}

impl Settings {
  /// Settings for the host with the default build type.
  pub fn detect() -> Result<Self, SettingsError> {
    let platform = Platform::detect()?;
    Ok(Self {
      os: platform.os,
      arch: platform.arch,
      build_type: BuildType::default(),
    })
  }

  /// Apply one `key=value` assignment, returning the updated settings.
  pub fn with_assignment(mut self, assignment: &str) -> Result<Self, SettingsError> {
    let (key, value) = assignment
      .split_once('=')
      .ok_or_else(|| SettingsError::Malformed(assignment.to_string()))?;
    let value = value.trim();

    match key.trim() {
      "os" => self.os = value.parse()?,
      "arch" => self.arch = value.parse()?,
      "build_type" => self.build_type = value.parse()?,
      other => return Err(SettingsError::UnknownSetting(other.to_string())),
    }

    Ok(self)
  }

  /// Apply several assignments in order; later ones win.
  pub fn with_assignments<'a, I>(self, assignments: I) -> Result<Self, SettingsError>
  where
    I: IntoIterator<Item = &'a str>,
  {
    assignments
      .into_iter()
      .try_fold(self, |settings, assignment| settings.with_assignment(assignment))
  }
}

impl fmt::Display for Settings {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "os={} arch={} build_type={}", self.os, self.arch, self.build_type)
  }
}
