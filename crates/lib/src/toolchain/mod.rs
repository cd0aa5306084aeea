//! Build configuration: the toolchain variables derived from the options.
//!
//! [`BuildConfiguration::generate`] is a pure function of the resolved
//! options and the settings; [`cmake`] renders it for CMake and drives the
//! CMake build.

pub mod cmake;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::options::ResolvedOptions;
use crate::settings::{BuildType, Settings};

/// Toolchain variable enabling the test targets.
pub const VAR_TEST: &str = "TEST";
/// Toolchain variable selecting a shared (dynamic) library build.
pub const VAR_SHARED_BUILD: &str = "SHARED_BUILD";
/// Toolchain variable enabling the example targets.
pub const VAR_EXAMPLE: &str = "EXAMPLE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfiguration {
  /// `TEST`, `SHARED_BUILD` and `EXAMPLE`.
  pub variables: BTreeMap<String, bool>,
  /// `BUILD_SHARED_LIBS`
  pub shared_libs: bool,
  /// `CMAKE_POSITION_INDEPENDENT_CODE`, absent when `fPIC` is not an option.
  pub position_independent_code: Option<bool>,
  pub build_type: BuildType,
}

impl BuildConfiguration {
  /// `generate`: copy each option's truth value into its toolchain variable.
  pub fn generate(options: &ResolvedOptions, settings: &Settings) -> Self {
    let variables = BTreeMap::from([
      (VAR_TEST.to_string(), options.test),
      (VAR_SHARED_BUILD.to_string(), options.shared()),
      (VAR_EXAMPLE.to_string(), options.example),
    ]);

    Self {
      variables,
      shared_libs: options.shared(),
      position_independent_code: options.fpic(),
      build_type: settings.build_type,
    }
  }

  pub fn variable(&self, name: &str) -> Option<bool> {
    self.variables.get(name).copied()
  }

  /// Whether the build stage runs the test runner.
  pub fn runs_tests(&self) -> bool {
    self.variable(VAR_TEST).unwrap_or(false)
  }
}
