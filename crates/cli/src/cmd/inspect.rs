//! Implementation of the `cradle inspect` command.
//!
//! Resolves options and derives the build configuration without touching
//! the filesystem.

use anyhow::Result;
use cradle_lib::pipeline::Pipeline;
use cradle_lib::toolchain::BuildConfiguration;
use cradle_lib::toolchain::cmake::CMake;

use super::{Invocation, RecipeArgs, stage_error};
use crate::output::{OutputFormat, Status, emit_json, field, item, on_off, section, status};

pub fn cmd_inspect(args: &RecipeArgs, format: OutputFormat) -> Result<()> {
  let inv = Invocation::prepare(args, None)?;
  let tool = CMake::new(&inv.request.tools);
  let resolution = Pipeline::new(&inv.recipe, &inv.request, &tool)
    .resolve()
    .map_err(stage_error)?;
  let config = BuildConfiguration::generate(&resolution.options, &inv.request.settings);
  let identity = &inv.recipe.identity;

  if format.is_json() {
    return emit_json(&serde_json::json!({
      "reference": identity.reference(),
      "identity": identity,
      "settings": inv.request.settings,
      "options": resolution.options,
      "configuration": config,
      "package_id": resolution.package_id,
      "exports_sources": inv.recipe.exports_sources,
      "cpp_info": inv.recipe.package_info(),
    }));
  }

  status(Status::Step, &identity.reference());
  if let Some(description) = &identity.description {
    field("Description", description);
  }
  if let Some(license) = &identity.license {
    field("License", license);
  }
  field("Settings", &inv.request.settings.to_string());
  field("Package id", &resolution.package_id.to_string());

  section("Options");
  for (name, value) in resolution.options.iter() {
    item(&format!("{name}={value}"));
  }

  section("Toolchain variables");
  for (name, value) in &config.variables {
    item(&format!("{name} = {}", on_off(*value)));
  }

  section("Libraries");
  for lib in &inv.recipe.libs {
    item(lib);
  }

  Ok(())
}
