//! Implementation of the `cradle package` command.
//!
//! Collects the artifacts of an existing local build into a package
//! folder without building anything.

use std::path::Path;

use anyhow::Result;
use cradle_lib::package::EmptyMatchPolicy;
use cradle_lib::pipeline::Pipeline;
use cradle_lib::toolchain::cmake::CMake;

use super::{Invocation, RecipeArgs, stage_error};
use crate::output::{Status, field, file_list, status};

pub fn cmd_package(
  args: &RecipeArgs,
  package_folder: Option<&Path>,
  on_empty_match: Option<EmptyMatchPolicy>,
) -> Result<()> {
  let inv = Invocation::prepare(args, on_empty_match)?;
  let tool = CMake::new(&inv.request.tools);
  let outcome = Pipeline::new(&inv.recipe, &inv.request, &tool)
    .package_local(&inv.source, package_folder)
    .map_err(stage_error)?;

  status(Status::Done, &format!("Packaged {}", inv.recipe.identity.reference()));
  field("Path", &outcome.package_folder.display().to_string());
  field("Package id", &outcome.manifest.package_id.to_string());
  file_list(outcome.manifest.files.keys());

  Ok(())
}
