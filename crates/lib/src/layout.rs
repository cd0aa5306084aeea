//! Folder layout of one build, following the CMake layout convention.
//!
//! ```text
//! <source>/
//! └── build/
//!     └── Release/            # single-config generators
//!         └── generators/
//! <source>/build/generators/  # multi-config generators
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::consts::{BUILD_CONFIG_FILENAME, TOOLCHAIN_FILENAME};
use crate::settings::BuildType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
  pub source: PathBuf,
  pub build: PathBuf,
  pub generators: PathBuf,
  pub package: PathBuf,
  pub multi_config: bool,
}

impl Layout {
  pub fn cmake(source: &Path, build_type: BuildType, multi_config: bool, package: &Path) -> Self {
    let build = if multi_config {
      source.join("build")
    } else {
      source.join("build").join(build_type.as_str())
    };
    let generators = build.join("generators");

    Self {
      source: source.to_path_buf(),
      build,
      generators,
      package: package.to_path_buf(),
      multi_config,
    }
  }

  pub fn toolchain_file(&self) -> PathBuf {
    self.generators.join(TOOLCHAIN_FILENAME)
  }

  pub fn build_config_file(&self) -> PathBuf {
    self.generators.join(BUILD_CONFIG_FILENAME)
  }
}

/// Whether a CMake generator builds several configurations from one tree.
///
/// Without an explicit generator CMake picks Visual Studio on Windows hosts
/// and Makefiles elsewhere.
pub fn is_multi_config(generator: Option<&str>) -> bool {
  match generator {
    Some(name) => name.starts_with("Visual Studio") || name == "Xcode" || name == "Ninja Multi-Config",
    None => cfg!(windows),
  }
}
