//! CMake: toolchain file rendering and the CMake build tool.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::{debug, info};

use super::BuildConfiguration;
use crate::config::ToolsConfig;
use crate::execute::{BuildTool, ExecuteError, run_command};
use crate::layout::Layout;

fn on_off(value: bool) -> &'static str {
  if value { "ON" } else { "OFF" }
}

/// Render the toolchain file for a configuration.
///
/// The output depends only on its inputs, so regenerating an unchanged
/// configuration rewrites identical bytes.
pub fn render_toolchain(config: &BuildConfiguration, reference: &str) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "# Generated by cradle for {reference}. Do not edit.");
  out.push_str("include_guard()\n\n");
  out.push_str("message(STATUS \"Using cradle toolchain: ${CMAKE_CURRENT_LIST_FILE}\")\n\n");

  let _ = writeln!(
    out,
    "set(BUILD_SHARED_LIBS {} CACHE BOOL \"Build shared libraries\" FORCE)",
    on_off(config.shared_libs)
  );
  if let Some(pic) = config.position_independent_code {
    let _ = writeln!(
      out,
      "set(CMAKE_POSITION_INDEPENDENT_CODE {} CACHE BOOL \"Position independent code\" FORCE)",
      on_off(pic)
    );
  }

  out.push_str("\n# Dependency lookup: package config files live next to this toolchain\n");
  out.push_str("list(PREPEND CMAKE_PREFIX_PATH \"${CMAKE_CURRENT_LIST_DIR}\")\n");
  out.push_str("list(PREPEND CMAKE_MODULE_PATH \"${CMAKE_CURRENT_LIST_DIR}\")\n");
  out.push_str("set(CMAKE_FIND_PACKAGE_PREFER_CONFIG ON)\n");

  out.push_str("\n# Recipe variables\n");
  for (name, value) in &config.variables {
    let _ = writeln!(
      out,
      "set({name} {} CACHE BOOL \"Variable {name} defined by cradle\" FORCE)",
      on_off(*value)
    );
  }

  out
}

/// Write the toolchain file and the serialized configuration into the
/// generators folder. Returns the toolchain file path.
pub fn write_toolchain(layout: &Layout, config: &BuildConfiguration, reference: &str) -> io::Result<PathBuf> {
  fs::create_dir_all(&layout.generators)?;

  let toolchain = layout.toolchain_file();
  fs::write(&toolchain, render_toolchain(config, reference))?;
  fs::write(layout.build_config_file(), serde_json::to_string_pretty(config)?)?;

  info!(path = %toolchain.display(), "toolchain generated");
  Ok(toolchain)
}

/// Drives `cmake` for configure, build and test.
#[derive(Debug, Clone)]
pub struct CMake {
  program: String,
  generator: Option<String>,
  jobs: Option<usize>,
  env: BTreeMap<String, String>,
}

impl CMake {
  pub fn new(tools: &ToolsConfig) -> Self {
    Self {
      program: tools.cmake.clone(),
      generator: tools.generator.clone(),
      jobs: tools.jobs,
      env: tools.env.clone(),
    }
  }

  fn uses_visual_studio(&self) -> bool {
    match &self.generator {
      Some(name) => name.starts_with("Visual Studio"),
      None => cfg!(windows),
    }
  }

  fn build_dir_args(&self, layout: &Layout, config: &BuildConfiguration) -> Vec<String> {
    let mut args = vec!["--build".to_string(), layout.build.display().to_string()];
    if layout.multi_config {
      args.push("--config".to_string());
      args.push(config.build_type.to_string());
    }
    args
  }

  pub fn configure_args(&self, layout: &Layout, config: &BuildConfiguration) -> Vec<String> {
    let mut args = vec![
      "-S".to_string(),
      layout.source.display().to_string(),
      "-B".to_string(),
      layout.build.display().to_string(),
    ];
    if let Some(generator) = &self.generator {
      args.push("-G".to_string());
      args.push(generator.clone());
    }
    args.push(format!("-DCMAKE_TOOLCHAIN_FILE={}", layout.toolchain_file().display()));
    if !layout.multi_config {
      args.push(format!("-DCMAKE_BUILD_TYPE={}", config.build_type));
    }
    args
  }

  pub fn build_args(&self, layout: &Layout, config: &BuildConfiguration) -> Vec<String> {
    let mut args = self.build_dir_args(layout, config);
    if let Some(jobs) = self.jobs {
      args.push("--parallel".to_string());
      args.push(jobs.to_string());
    }
    args
  }

  pub fn test_args(&self, layout: &Layout, config: &BuildConfiguration) -> Vec<String> {
    let mut args = self.build_dir_args(layout, config);
    args.push("--target".to_string());
    args.push(if self.uses_visual_studio() { "RUN_TESTS" } else { "test" }.to_string());
    args
  }

  async fn run(&self, layout: &Layout, args: Vec<String>, extra_env: &[(&str, &str)]) -> Result<(), ExecuteError> {
    fs::create_dir_all(&layout.build)?;

    let mut env = self.env.clone();
    for (key, value) in extra_env {
      env.insert(key.to_string(), value.to_string());
    }

    let output = run_command(&self.program, &args, &layout.build, &env).await?;
    debug!(bytes = output.stdout.len(), "cmake finished");
    Ok(())
  }
}

impl BuildTool for CMake {
  async fn configure(&self, layout: &Layout, config: &BuildConfiguration) -> Result<(), ExecuteError> {
    self.run(layout, self.configure_args(layout, config), &[]).await
  }

  async fn build(&self, layout: &Layout, config: &BuildConfiguration) -> Result<(), ExecuteError> {
    self.run(layout, self.build_args(layout, config), &[]).await
  }

  async fn test(&self, layout: &Layout, config: &BuildConfiguration) -> Result<(), ExecuteError> {
    self
      .run(layout, self.test_args(layout, config), &[("CTEST_OUTPUT_ON_FAILURE", "1")])
      .await
  }
}
