//! Package metadata written into every package root.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::PackageError;
use crate::consts::PACKAGE_MANIFEST_FILENAME;
use crate::options::ResolvedOptions;
use crate::recipe::{CppInfo, PackageIdentity};
use crate::settings::Settings;
use crate::util::hash::{PackageId, hash_file};
use crate::util::to_slash;

/// Describes a built package: what it is, how it was configured, and the
/// digest of every file that was copied into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
  pub reference: String,
  pub package_id: PackageId,
  pub identity: PackageIdentity,
  pub settings: Settings,
  pub options: BTreeMap<String, bool>,
  pub cpp_info: CppInfo,
  /// Relative path (with `/` separators) to SHA-256.
  pub files: BTreeMap<String, String>,
}

impl PackageManifest {
  /// Build the manifest for a staged package rooted at `root`.
  pub fn describe(
    identity: &PackageIdentity,
    package_id: &PackageId,
    settings: &Settings,
    options: &ResolvedOptions,
    cpp_info: &CppInfo,
    root: &Path,
    files: &[PathBuf],
  ) -> Result<Self, PackageError> {
    let mut digests = BTreeMap::new();
    for rel in files {
      digests.insert(to_slash(rel), hash_file(&root.join(rel))?.0);
    }

    Ok(Self {
      reference: identity.reference(),
      package_id: package_id.clone(),
      identity: identity.clone(),
      settings: *settings,
      options: options
        .to_map()
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect(),
      cpp_info: cpp_info.clone(),
      files: digests,
    })
  }

  /// Read the manifest of a committed package.
  pub fn load(package_folder: &Path) -> Result<Self, PackageError> {
    let content = fs::read_to_string(package_folder.join(PACKAGE_MANIFEST_FILENAME))?;
    Ok(serde_json::from_str(&content)?)
  }
}
