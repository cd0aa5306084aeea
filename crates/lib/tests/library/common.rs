//! Shared helpers for library integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use cradle_lib::config::{BuildRequest, ToolsConfig};
use cradle_lib::execute::{BuildStep, BuildTool, ExecuteError};
use cradle_lib::layout::Layout;
use cradle_lib::options::OptionOverrides;
use cradle_lib::package::EmptyMatchPolicy;
use cradle_lib::platform::arch::Arch;
use cradle_lib::platform::os::Os;
use cradle_lib::settings::{BuildType, Settings};
use cradle_lib::toolchain::BuildConfiguration;
use tempfile::TempDir;
use walkdir::WalkDir;

/// A build tool that records its calls and writes fake artifacts on
/// compile.
#[derive(Default)]
pub struct RecordingTool {
  pub calls: Mutex<Vec<BuildStep>>,
  pub fail_on: Option<BuildStep>,
  pub outputs: Vec<&'static str>,
}

impl RecordingTool {
  pub fn producing(outputs: &[&'static str]) -> Self {
    Self {
      outputs: outputs.to_vec(),
      ..Self::default()
    }
  }

  pub fn failing(step: BuildStep) -> Self {
    Self {
      fail_on: Some(step),
      ..Self::default()
    }
  }

  pub fn calls(&self) -> Vec<BuildStep> {
    self.calls.lock().unwrap().clone()
  }

  fn record(&self, step: BuildStep) -> Result<(), ExecuteError> {
    self.calls.lock().unwrap().push(step);
    if self.fail_on == Some(step) {
      return Err(ExecuteError::CmdFailed {
        cmd: format!("cmake {step}"),
        code: Some(1),
        stderr: format!("{step} exploded\n"),
      });
    }
    Ok(())
  }
}

impl BuildTool for RecordingTool {
  async fn configure(&self, layout: &Layout, _config: &BuildConfiguration) -> Result<(), ExecuteError> {
    self.record(BuildStep::Configure)?;
    assert!(layout.toolchain_file().is_file(), "toolchain must exist before configure");
    Ok(())
  }

  async fn build(&self, layout: &Layout, _config: &BuildConfiguration) -> Result<(), ExecuteError> {
    self.record(BuildStep::Compile)?;
    for rel in &self.outputs {
      write_file(&layout.build.join(rel), rel);
    }
    Ok(())
  }

  async fn test(&self, _layout: &Layout, _config: &BuildConfiguration) -> Result<(), ExecuteError> {
    self.record(BuildStep::Test)
  }
}

pub fn write_file(path: &Path, content: &str) {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, content).unwrap();
}

/// Isolated checkout, store and build cache.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    for (rel, content) in [
      ("LICENSE", "MIT License\n"),
      ("CMakeLists.txt", "cmake_minimum_required(VERSION 3.15)\nproject(cargparse C)\n"),
      ("include/ArgParse.h", "#pragma once\n"),
      ("src/ArgParse.c", "#include \"ArgParse.h\"\n"),
      ("src/ArgParseTools.h", "#pragma once\n"),
      ("tests/test_val.c", "int main(void) { return 0; }\n"),
      ("README.md", "# cargparse\n"),
    ] {
      write_file(&env.checkout().join(rel), content);
    }
    env
  }

  pub fn checkout(&self) -> PathBuf {
    self.temp.path().join("checkout")
  }

  pub fn store(&self) -> PathBuf {
    self.temp.path().join("store")
  }

  pub fn builds(&self) -> PathBuf {
    self.temp.path().join("cache/builds")
  }
}

pub fn request(os: Os, options: &[&str]) -> BuildRequest {
  BuildRequest {
    settings: Settings {
      os,
      arch: Arch::X86_64,
      build_type: BuildType::Release,
    },
    overrides: OptionOverrides::from_assignments(options.iter().copied()).unwrap(),
    on_empty_match: EmptyMatchPolicy::default(),
    tools: ToolsConfig {
      generator: Some("Ninja".to_string()),
      ..ToolsConfig::default()
    },
  }
}

/// Every file below `root`, relative and `/`-separated, sorted.
pub fn tree(root: &Path) -> Vec<String> {
  let mut files: Vec<String> = WalkDir::new(root)
    .into_iter()
    .filter_map(Result::ok)
    .filter(|e| e.file_type().is_file())
    .map(|e| {
      e.path()
        .strip_prefix(root)
        .unwrap()
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
    })
    .collect();
  files.sort();
  files
}
