//! Profiles and the per-invocation build request.
//!
//! A profile is a TOML file with settings, option values, build-tool
//! choices and packaging behaviour. Command-line values are layered on top
//! of it, and it is layered on top of the detected host and the recipe
//! defaults.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::options::{OptionLiteral, OptionOverrides, OptionsError};
use crate::package::EmptyMatchPolicy;
use crate::settings::{Settings, SettingsError};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read profile {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("invalid profile {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error(transparent)]
  Settings(#[from] SettingsError),

  #[error(transparent)]
  Options(#[from] OptionsError),
}

/// `[settings]`: values kept as text and parsed like `-s key=value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileSettings {
  pub os: Option<String>,
  pub arch: Option<String>,
  pub build_type: Option<String>,
}

impl ProfileSettings {
  fn assignments(&self) -> Vec<String> {
    [("os", &self.os), ("arch", &self.arch), ("build_type", &self.build_type)]
      .into_iter()
      .filter_map(|(key, value)| value.as_ref().map(|v| format!("{key}={v}")))
      .collect()
  }
}

/// `[tools]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
  /// CMake executable, looked up in `PATH` unless it is a path.
  pub cmake: String,
  pub generator: Option<String>,
  pub jobs: Option<usize>,
  /// Extra environment for every build-tool invocation.
  pub env: BTreeMap<String, String>,
}

impl Default for ToolsConfig {
  fn default() -> Self {
    Self {
      cmake: "cmake".to_string(),
      generator: None,
      jobs: None,
      env: BTreeMap::new(),
    }
  }
}

/// `[package]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageConfig {
  pub on_empty_match: Option<EmptyMatchPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
  pub settings: ProfileSettings,
  pub options: BTreeMap<String, OptionLiteral>,
  pub tools: ToolsConfig,
  pub package: PackageConfig,
}

impl Profile {
  pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let profile = Self::parse(&content, path)?;
    debug!(path = %path.display(), "loaded profile");
    Ok(profile)
  }
}

/// Everything one invocation needs besides the recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
  pub settings: Settings,
  pub overrides: OptionOverrides,
  pub on_empty_match: EmptyMatchPolicy,
  pub tools: ToolsConfig,
}

/// Command-line values, the top layer of a [`BuildRequest`].
#[derive(Debug, Clone, Default)]
pub struct CliOverrides<'a> {
  pub settings: &'a [String],
  pub options: &'a [String],
  pub on_empty_match: Option<EmptyMatchPolicy>,
}

impl BuildRequest {
  /// Assemble a request from the host, an optional profile, and the
  /// command line, in increasing order of precedence.
  pub fn assemble(profile: Option<&Profile>, cli: &CliOverrides) -> Result<Self, ConfigError> {
    let default_profile = Profile::default();
    let profile = profile.unwrap_or(&default_profile);

    let settings = Settings::detect()?
      .with_assignments(profile.settings.assignments().iter().map(String::as_str))?
      .with_assignments(cli.settings.iter().map(String::as_str))?;

    let overrides = OptionOverrides::from_table(&profile.options)?
      .merged_with(&OptionOverrides::from_assignments(cli.options.iter().map(String::as_str))?);

    let on_empty_match = cli
      .on_empty_match
      .or(profile.package.on_empty_match)
      .unwrap_or_default();

    debug!(settings = %settings, on_empty_match = %on_empty_match, "assembled build request");

    Ok(Self {
      settings,
      overrides,
      on_empty_match,
      tools: profile.tools.clone(),
    })
  }
}
