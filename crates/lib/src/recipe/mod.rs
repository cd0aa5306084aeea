//! The recipe descriptor: identity, options, exported sources, packaging
//! rules and the libraries the package exposes.
//!
//! The cargparse recipe is built in. A source directory may carry a
//! `cradle.toml` that replaces individual sections of it:
//!
//! ```toml
//! exports_sources = ["include/*", "src/*", "CMakeLists.txt", "LICENSE"]
//! libs = ["cargparse"]
//!
//! [package]
//! name = "cargparse"
//! version = "0.3.2"
//! license = "MIT"
//!
//! [options]
//! test = false
//!
//! [[copy]]
//! pattern = "*.a"
//! from = "build"
//! dst = "lib"
//! flatten = true
//! ```
//!
//! Sections left out keep their built-in values.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::RECIPE_FILENAME;
use crate::options::{DefaultOptions, OptionOverrides, ResolvedOptions, resolve};
use crate::package::{CopyRule, default_rules};
use crate::platform::os::Os;
use crate::settings::Settings;
use crate::util::hash::{HashError, Hashable, PackageId};

/// Errors raised while loading or validating a recipe.
#[derive(Debug, Error)]
pub enum RecipeError {
  #[error("failed to read recipe {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("invalid recipe {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("invalid recipe: {0}")]
  Invalid(String),
}

/// Who the package is. Immutable once the recipe is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageIdentity {
  pub name: String,
  pub version: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub license: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default)]
  pub topics: Vec<String>,
}

impl PackageIdentity {
  /// `name/version`
  pub fn reference(&self) -> String {
    format!("{}/{}", self.name, self.version)
  }
}

/// What the package exposes to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CppInfo {
  pub libs: Vec<String>,
  pub includedirs: Vec<String>,
  pub libdirs: Vec<String>,
  pub bindirs: Vec<String>,
}

impl CppInfo {
  pub fn for_libs(libs: &[String]) -> Self {
    Self {
      libs: libs.to_vec(),
      includedirs: vec!["include".to_string()],
      libdirs: vec!["lib".to_string()],
      bindirs: vec!["bin".to_string()],
    }
  }
}

/// Inputs that distinguish one binary package from another.
#[derive(Serialize)]
struct PackageIdInputs<'a> {
  reference: String,
  settings: &'a Settings,
  options: &'a ResolvedOptions,
}

impl Hashable for PackageIdInputs<'_> {}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
  pub identity: PackageIdentity,
  pub default_options: DefaultOptions,
  pub exports_sources: Vec<String>,
  pub package: Vec<CopyRule>,
  pub libs: Vec<String>,
}

/// On-disk form of a recipe override. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecipeFile {
  package: Option<PackageIdentity>,
  options: Option<DefaultOptions>,
  exports_sources: Option<Vec<String>>,
  copy: Option<Vec<CopyRule>>,
  libs: Option<Vec<String>>,
}

impl Recipe {
  /// The built-in cargparse recipe.
  pub fn cargparse() -> Self {
    let topics = ["argparse", "C", "simple", "easy-to-use", "CArgParse", "args", "cargparse"];

    Self {
      identity: PackageIdentity {
        name: "cargparse".to_string(),
        version: "0.3.1".to_string(),
        license: Some("MIT".to_string()),
        author: Some("321640253@qq.com".to_string()),
        url: Some("https://gitea.youmetme.wang/youmetme/logging".to_string()),
        description: Some("C语言命令行参数解析器".to_string()),
        topics: topics.iter().map(|t| t.to_string()).collect(),
      },
      default_options: DefaultOptions::default(),
      exports_sources: ["include/*", "CMakeLists.txt", "src/*", "tests/*", "examples/*", "LICENSE"]
        .iter()
        .map(|p| p.to_string())
        .collect(),
      package: default_rules(),
      libs: vec!["cargparse".to_string()],
    }
  }

  /// Parse a recipe override on top of the built-in recipe.
  pub fn from_toml(content: &str, path: &Path) -> Result<Self, RecipeError> {
    let file: RecipeFile = toml::from_str(content).map_err(|source| RecipeError::Parse {
      path: path.to_path_buf(),
      source,
    })?;

    let mut recipe = Self::cargparse();
    if let Some(identity) = file.package {
      recipe.identity = identity;
    }
    if let Some(options) = file.options {
      recipe.default_options = options;
    }
    if let Some(exports) = file.exports_sources {
      recipe.exports_sources = exports;
    }
    if let Some(rules) = file.copy {
      recipe.package = rules;
    }
    if let Some(libs) = file.libs {
      recipe.libs = libs;
    }

    recipe.validate()?;
    Ok(recipe)
  }

  /// Load the recipe for a source directory: `cradle.toml` when present,
  /// otherwise the built-in recipe.
  pub fn load(source_dir: &Path) -> Result<Self, RecipeError> {
    let path = source_dir.join(RECIPE_FILENAME);
    if !path.is_file() {
      debug!(dir = %source_dir.display(), "no recipe file, using built-in recipe");
      return Ok(Self::cargparse());
    }

    let content = fs::read_to_string(&path).map_err(|source| RecipeError::Read {
      path: path.clone(),
      source,
    })?;
    let recipe = Self::from_toml(&content, &path)?;
    info!(path = %path.display(), reference = %recipe.identity.reference(), "loaded recipe");
    Ok(recipe)
  }

  pub fn validate(&self) -> Result<(), RecipeError> {
    if self.identity.name.trim().is_empty() {
      return Err(RecipeError::Invalid("package name cannot be empty".to_string()));
    }
    if self.identity.version.trim().is_empty() {
      return Err(RecipeError::Invalid("package version cannot be empty".to_string()));
    }
    if self.libs.is_empty() {
      return Err(RecipeError::Invalid("recipe must export at least one library".to_string()));
    }

    let patterns = self
      .exports_sources
      .iter()
      .chain(self.package.iter().map(|rule| &rule.pattern));
    for pattern in patterns {
      glob::Pattern::new(pattern)
        .map_err(|e| RecipeError::Invalid(format!("invalid pattern '{}': {}", pattern, e)))?;
    }

    if let Some(rule) = self.package.iter().find(|rule| !rule.has_safe_destination()) {
      return Err(RecipeError::Invalid(format!(
        "copy destination '{}' escapes the package folder",
        rule.dst
      )));
    }

    Ok(())
  }

  /// `config_options` + `configure`: resolve the option set for `os`.
  pub fn resolve_options(&self, overrides: &OptionOverrides, os: Os) -> ResolvedOptions {
    resolve(&self.default_options, overrides, os)
  }

  /// `package_info`: the libraries consumers link against.
  pub fn package_info(&self) -> CppInfo {
    CppInfo::for_libs(&self.libs)
  }

  pub fn package_id(&self, settings: &Settings, options: &ResolvedOptions) -> Result<PackageId, HashError> {
    PackageIdInputs {
      reference: self.identity.reference(),
      settings,
      options,
    }
    .compute_hash()
  }
}
