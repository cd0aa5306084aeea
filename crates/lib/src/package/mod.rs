//! Packaging: relocating build outputs into the package layout.
//!
//! Artifact collection is driven by an explicit, ordered list of
//! [`CopyRule`]s. Rules are first evaluated into a [`CopyPlan`], which lists
//! every file that will be copied and every rule that matched nothing. Only
//! then is anything written, into a staging directory that is moved into
//! place once the whole package is complete.
//!
//! # Package layout
//!
//! ```text
//! <package>/
//! ├── licenses/LICENSE
//! ├── include/*.h
//! ├── lib/*.{a,so,lib,dylib}
//! ├── bin/*.dll
//! └── cradle-package.json
//! ```

mod copy;
pub mod manifest;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use copy::{CopyPlan, PlannedCopy, Roots, StagedPackage, check_destination, copy_into, plan_copies, stage};
pub use manifest::PackageManifest;

/// Errors that can occur while collecting or committing a package.
#[derive(Debug, Error)]
pub enum PackageError {
  #[error("invalid pattern '{pattern}': {source}")]
  Pattern {
    pattern: String,
    #[source]
    source: glob::PatternError,
  },

  #[error("failed to walk {root}: {source}")]
  Walk {
    root: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("failed to copy {from} to {to}: {source}")]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("no files matched '{pattern}' in {root}")]
  EmptyMatch { pattern: String, root: PathBuf },

  #[error("failed to move package into {dest}: {source}")]
  Commit {
    dest: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("refusing to package into {dest}: {reason}")]
  UnsafeDestination { dest: PathBuf, reason: &'static str },

  #[error("failed to serialize package manifest: {0}")]
  Manifest(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] io::Error),
}

/// Which tree a copy rule reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Root {
  Source,
  Build,
}

/// One entry of the packaging manifest.
///
/// `pattern` is matched against the path relative to `from` (joined with
/// `subdir`); `*` also crosses directory separators. With `flatten` only the
/// file name is kept below `dst`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopyRule {
  pub pattern: String,
  pub from: Root,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subdir: Option<String>,
  pub dst: String,
  #[serde(default)]
  pub flatten: bool,
}

impl CopyRule {
  pub fn new(pattern: &str, from: Root, dst: &str) -> Self {
    Self {
      pattern: pattern.to_string(),
      from,
      subdir: None,
      dst: dst.to_string(),
      flatten: false,
    }
  }

  pub fn with_subdir(mut self, subdir: &str) -> Self {
    self.subdir = Some(subdir.to_string());
    self
  }

  pub fn flattened(mut self) -> Self {
    self.flatten = true;
    self
  }

  /// The directory this rule walks.
  pub fn root_in(&self, roots: &Roots) -> PathBuf {
    let base = match self.from {
      Root::Source => roots.source,
      Root::Build => roots.build,
    };
    match &self.subdir {
      Some(subdir) => base.join(subdir),
      None => base.to_path_buf(),
    }
  }

  /// Reject destinations that would escape the package root.
  pub fn has_safe_destination(&self) -> bool {
    let dst = Path::new(&self.dst);
    !dst.is_absolute()
      && dst
        .components()
        .all(|c| matches!(c, std::path::Component::Normal(_) | std::path::Component::CurDir))
  }
}

/// The packaging rules of the cargparse recipe, in evaluation order.
pub fn default_rules() -> Vec<CopyRule> {
  vec![
    CopyRule::new("LICENSE", Root::Source, "licenses"),
    CopyRule::new("*.h", Root::Source, "include").with_subdir("include"),
    CopyRule::new("*.a", Root::Build, "lib").flattened(),
    CopyRule::new("*.so", Root::Build, "lib").flattened(),
    CopyRule::new("*.lib", Root::Build, "lib").flattened(),
    CopyRule::new("*.dll", Root::Build, "bin").flattened(),
    CopyRule::new("*.dylib", Root::Build, "lib").flattened(),
  ]
}

/// What to do when a rule matches no files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyMatchPolicy {
  #[default]
  Ignore,
  Warn,
  Error,
}

impl EmptyMatchPolicy {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Ignore => "ignore",
      Self::Warn => "warn",
      Self::Error => "error",
    }
  }
}

impl fmt::Display for EmptyMatchPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for EmptyMatchPolicy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "ignore" => Ok(Self::Ignore),
      "warn" => Ok(Self::Warn),
      "error" => Ok(Self::Error),
      _ => Err(format!("unknown policy '{s}' (expected ignore, warn or error)")),
    }
  }
}
