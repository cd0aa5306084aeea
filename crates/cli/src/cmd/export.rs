//! Implementation of the `cradle export` command.

use std::path::Path;

use anyhow::{Context, Result};
use cradle_lib::export::export_sources;
use cradle_lib::recipe::Recipe;

use crate::output::{Status, status};

pub fn cmd_export(path: &Path, to: &Path) -> Result<()> {
  let recipe = Recipe::load(path).context("Failed to load recipe")?;
  let files = export_sources(&recipe, path, to)
    .with_context(|| format!("Failed to export sources to {}", to.display()))?;

  status(Status::Done, &format!(
    "Exported {} file(s) of {} to {}",
    files.len(),
    recipe.identity.reference(),
    to.display()
  ));

  Ok(())
}
