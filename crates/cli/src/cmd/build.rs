//! Implementation of the `cradle build` command.

use std::time::Instant;

use anyhow::Result;
use cradle_lib::pipeline::Pipeline;
use cradle_lib::toolchain::cmake::CMake;

use super::{Invocation, RecipeArgs, runtime, stage_error};
use crate::output::{Status, elapsed, field, status};

/// Generate, configure, compile and (when `test` is on) test in the
/// source tree.
pub fn cmd_build(args: &RecipeArgs) -> Result<()> {
  let inv = Invocation::prepare(args, None)?;
  let tool = CMake::new(&inv.request.tools);
  let pipeline = Pipeline::new(&inv.recipe, &inv.request, &tool);
  let started = Instant::now();

  let outcome = runtime()?
    .block_on(pipeline.build_local(&inv.source))
    .map_err(stage_error)?;

  status(Status::Done, &format!("Built {}", inv.recipe.identity.reference()));
  field("Build folder", &outcome.generated.layout.build.display().to_string());
  field(
    "Tests",
    if outcome.report.ran_tests() { "passed" } else { "skipped" },
  );
  field("Duration", &elapsed(started.elapsed()));

  Ok(())
}
