//! Source export: copying the files a recipe needs out of a checkout.
//!
//! `exports_sources` patterns are matched against paths relative to the
//! source directory and the matches keep their relative location. The
//! recipe file itself travels with the sources.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::consts::RECIPE_FILENAME;
use crate::package::{CopyRule, PackageError, Root, Roots, copy_into, plan_copies};
use crate::recipe::Recipe;

fn export_rules(recipe: &Recipe) -> Vec<CopyRule> {
  recipe
    .exports_sources
    .iter()
    .map(|pattern| CopyRule::new(pattern, Root::Source, ""))
    .chain(std::iter::once(CopyRule::new(RECIPE_FILENAME, Root::Source, "")))
    .collect()
}

/// Copy the exported sources of `recipe` from `from` into `to`.
///
/// Returns the copied paths relative to `to`. `to` and the checkout's
/// `build` folder are never read from.
pub fn export_sources(recipe: &Recipe, from: &Path, to: &Path) -> Result<Vec<PathBuf>, PackageError> {
  let rules = export_rules(recipe);
  let roots = Roots {
    source: from,
    build: from,
  };
  let build_dir = from.join("build");
  let plan = plan_copies(&rules, &roots, &[to, build_dir.as_path()])?;

  std::fs::create_dir_all(to)?;
  let files = copy_into(&plan, to)?;

  info!(from = %from.display(), to = %to.display(), files = files.len(), "exported sources");
  Ok(files)
}
