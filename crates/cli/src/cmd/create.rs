//! Implementation of the `cradle create` command.
//!
//! Runs the whole lifecycle out of tree and commits the package into the
//! local store.

use std::time::Instant;

use anyhow::Result;
use cradle_lib::package::EmptyMatchPolicy;
use cradle_lib::pipeline::Pipeline;
use cradle_lib::toolchain::cmake::CMake;

use super::{Invocation, RecipeArgs, runtime, stage_error};
use crate::output::{Status, elapsed, field, status};

pub fn cmd_create(args: &RecipeArgs, on_empty_match: Option<EmptyMatchPolicy>) -> Result<()> {
  let inv = Invocation::prepare(args, on_empty_match)?;
  let reference = inv.recipe.identity.reference();
  let tool = CMake::new(&inv.request.tools);
  let pipeline = Pipeline::new(&inv.recipe, &inv.request, &tool);

  status(Status::Step, &format!("Creating {} ({})", reference, inv.request.settings));
  let started = Instant::now();

  let outcome = runtime()?
    .block_on(pipeline.create(&inv.source))
    .map_err(stage_error)?;

  let manifest = &outcome.package.manifest;
  status(Status::Done, &format!("Created {}", reference));
  field("Package id", &manifest.package_id.to_string());
  field("Path", &outcome.package.package_folder.display().to_string());
  field("Files", &manifest.files.len().to_string());
  field(
    "Tests",
    if outcome.build.report.ran_tests() { "passed" } else { "skipped" },
  );
  field("Libs", &manifest.cpp_info.libs.join(", "));
  field("Duration", &elapsed(started.elapsed()));

  Ok(())
}
