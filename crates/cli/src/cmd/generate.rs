//! Implementation of the `cradle generate` command.

use anyhow::Result;
use cradle_lib::pipeline::Pipeline;
use cradle_lib::toolchain::cmake::CMake;

use super::{Invocation, RecipeArgs, stage_error};
use crate::output::{Status, field, on_off, status};

pub fn cmd_generate(args: &RecipeArgs) -> Result<()> {
  let inv = Invocation::prepare(args, None)?;
  let tool = CMake::new(&inv.request.tools);
  let outcome = Pipeline::new(&inv.recipe, &inv.request, &tool)
    .generate_local(&inv.source)
    .map_err(stage_error)?;

  status(Status::Done, &format!("Generated {}", outcome.toolchain.display()));
  for (name, value) in &outcome.config.variables {
    field(name, on_off(*value));
  }

  Ok(())
}
