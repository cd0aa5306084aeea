use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tempfile::TempDir;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{CopyRule, EmptyMatchPolicy, PackageError, PackageManifest};
use crate::consts::PACKAGE_MANIFEST_FILENAME;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
  case_sensitive: true,
  require_literal_separator: false,
  require_literal_leading_dot: false,
};

/// The trees copy rules read from.
#[derive(Debug, Clone, Copy)]
pub struct Roots<'a> {
  pub source: &'a Path,
  pub build: &'a Path,
}

/// One file the plan will copy; `to` is relative to the package root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
  pub rule: usize,
  pub from: PathBuf,
  pub to: PathBuf,
}

/// Result of evaluating copy rules, before anything is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyPlan {
  pub copies: Vec<PlannedCopy>,
  /// Indices of rules that matched nothing.
  pub empty_rules: Vec<usize>,
}

impl CopyPlan {
  /// Destinations in plan order.
  pub fn destinations(&self) -> Vec<&Path> {
    self.copies.iter().map(|c| c.to.as_path()).collect()
  }
}

/// Evaluate rules in order against the given roots.
///
/// Walks are sorted by file name. Directories listed in `exclude` are never
/// entered. A missing root is treated as an empty one. When two flattened
/// copies land on the same destination the later one replaces the earlier.
pub fn plan_copies(rules: &[CopyRule], roots: &Roots, exclude: &[&Path]) -> Result<CopyPlan, PackageError> {
  let mut plan = CopyPlan::default();

  for (index, rule) in rules.iter().enumerate() {
    let pattern = Pattern::new(&rule.pattern).map_err(|source| PackageError::Pattern {
      pattern: rule.pattern.clone(),
      source,
    })?;
    let root = rule.root_in(roots);
    let mut matched = 0usize;

    if root.is_dir() {
      let walker = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !exclude.iter().any(|x| e.path() == *x));

      for entry in walker {
        let entry = entry.map_err(|source| PackageError::Walk {
          root: root.clone(),
          source,
        })?;
        // Follows symlinks so versioned shared-library links are packaged too.
        if !entry.path().is_file() {
          continue;
        }

        let rel = entry.path().strip_prefix(&root).unwrap_or(entry.path());
        if !pattern.matches_path_with(rel, MATCH_OPTIONS) {
          continue;
        }

        let to = if rule.flatten {
          Path::new(&rule.dst).join(entry.file_name())
        } else {
          Path::new(&rule.dst).join(rel)
        };

        if let Some(pos) = plan.copies.iter().position(|c| c.to == to) {
          let replaced = plan.copies.remove(pos);
          warn!(
            dest = %to.display(),
            previous = %replaced.from.display(),
            current = %entry.path().display(),
            "two artifacts map to the same package path, keeping the later one"
          );
        }

        plan.copies.push(PlannedCopy {
          rule: index,
          from: entry.path().to_path_buf(),
          to,
        });
        matched += 1;
      }
    }

    debug!(pattern = %rule.pattern, root = %root.display(), matched, "evaluated copy rule");
    if matched == 0 {
      plan.empty_rules.push(index);
    }
  }

  Ok(plan)
}

/// Execute a plan below `dest_root`. Returns the written paths relative to
/// `dest_root`, in plan order. Sources are only read.
pub fn copy_into(plan: &CopyPlan, dest_root: &Path) -> Result<Vec<PathBuf>, PackageError> {
  let mut written = Vec::with_capacity(plan.copies.len());

  for copy in &plan.copies {
    let dest = dest_root.join(&copy.to);
    if let Some(parent) = dest.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::copy(&copy.from, &dest).map_err(|source| PackageError::Copy {
      from: copy.from.clone(),
      to: dest.clone(),
      source,
    })?;
    written.push(copy.to.clone());
  }

  Ok(written)
}

/// A fully copied package waiting to be moved into its final location.
#[derive(Debug)]
pub struct StagedPackage {
  dir: TempDir,
  files: Vec<PathBuf>,
}

impl StagedPackage {
  pub fn path(&self) -> &Path {
    self.dir.path()
  }

  /// Copied files, relative to the package root.
  pub fn files(&self) -> &[PathBuf] {
    &self.files
  }

  pub fn write_manifest(&self, manifest: &PackageManifest) -> Result<(), PackageError> {
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(self.path().join(PACKAGE_MANIFEST_FILENAME), json)?;
    Ok(())
  }

  /// Move the staged tree to `dest`, replacing any previous package there.
  pub fn commit(self, dest: &Path) -> Result<PathBuf, PackageError> {
    let commit_err = |source| PackageError::Commit {
      dest: dest.to_path_buf(),
      source,
    };

    if dest.is_dir() && dest.join(PACKAGE_MANIFEST_FILENAME).is_file() {
      fs::remove_dir_all(dest).map_err(commit_err)?;
    } else if dest.is_dir() && is_empty_dir(dest) {
      fs::remove_dir(dest).map_err(commit_err)?;
    } else if dest.exists() || dest.is_symlink() {
      return Err(PackageError::UnsafeDestination {
        dest: dest.to_path_buf(),
        reason: "it already exists and is not a package",
      });
    }
    fs::rename(self.dir.path(), dest).map_err(commit_err)?;

    info!(dest = %dest.display(), files = self.files.len(), "package committed");
    Ok(dest.to_path_buf())
  }
}

fn is_empty_dir(dir: &Path) -> bool {
  fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_none())
}

/// Refuse package folders that overlap the trees a package is read from.
///
/// `dest` must be absolute and resolved the same way as the roots. A folder
/// inside the source tree is only accepted below `build_base`.
pub fn check_destination(dest: &Path, roots: &Roots, build_base: &Path) -> Result<(), PackageError> {
  let reason = if roots.source.starts_with(dest) {
    Some("it is or contains the source folder")
  } else if roots.build.starts_with(dest) {
    Some("it is or contains the build folder")
  } else if dest.starts_with(roots.source) && !dest.starts_with(build_base) {
    Some("it is inside the source folder")
  } else {
    None
  };

  match reason {
    Some(reason) => Err(PackageError::UnsafeDestination {
      dest: dest.to_path_buf(),
      reason,
    }),
    None => Ok(()),
  }
}

/// Evaluate `rules` and copy the matches into a staging directory created
/// next to `package_folder`.
///
/// The policy is applied to empty rules before anything is copied, so an
/// `error` policy never leaves files behind.
pub fn stage(
  rules: &[CopyRule],
  roots: &Roots,
  package_folder: &Path,
  policy: EmptyMatchPolicy,
) -> Result<StagedPackage, PackageError> {
  let plan = plan_copies(rules, roots, &[package_folder])?;

  for &index in &plan.empty_rules {
    let rule = &rules[index];
    let root = rule.root_in(roots);
    match policy {
      EmptyMatchPolicy::Ignore => {
        debug!(pattern = %rule.pattern, root = %root.display(), "no files matched");
      }
      EmptyMatchPolicy::Warn => {
        warn!(pattern = %rule.pattern, root = %root.display(), "no files matched");
      }
      EmptyMatchPolicy::Error => {
        return Err(PackageError::EmptyMatch {
          pattern: rule.pattern.clone(),
          root,
        });
      }
    }
  }

  let parent = match package_folder.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
    _ => PathBuf::from("."),
  };
  fs::create_dir_all(&parent)?;

  let dir = tempfile::Builder::new()
    .prefix(".cradle-staging-")
    .tempdir_in(&parent)?;
  let files = copy_into(&plan, dir.path())?;

  Ok(StagedPackage { dir, files })
}
