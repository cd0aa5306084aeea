//! Driving the external build tool.
//!
//! The pipeline talks to the build system through [`BuildTool`]; the CMake
//! implementation lives in [`crate::toolchain::cmake`]. Each call blocks the
//! lifecycle until the tool exits.

pub mod cmd;
pub mod types;

use std::fmt;

use crate::layout::Layout;
use crate::toolchain::BuildConfiguration;

pub use cmd::{display_command, run_command};
pub use types::{CommandOutput, ExecuteError};

/// The three build-tool invocations of the build stage, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStep {
  Configure,
  Compile,
  Test,
}

impl BuildStep {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Configure => "configure",
      Self::Compile => "compile",
      Self::Test => "test",
    }
  }
}

impl fmt::Display for BuildStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// A build system that can configure, compile and test a source tree.
#[allow(async_fn_in_trait)]
pub trait BuildTool {
  async fn configure(&self, layout: &Layout, config: &BuildConfiguration) -> Result<(), ExecuteError>;

  async fn build(&self, layout: &Layout, config: &BuildConfiguration) -> Result<(), ExecuteError>;

  async fn test(&self, layout: &Layout, config: &BuildConfiguration) -> Result<(), ExecuteError>;
}
