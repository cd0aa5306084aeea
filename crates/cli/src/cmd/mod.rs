mod build;
mod create;
mod export;
mod generate;
mod info;
mod inspect;
mod package;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use cradle_lib::config::{BuildRequest, CliOverrides, Profile};
use cradle_lib::package::EmptyMatchPolicy;
use cradle_lib::pipeline::PipelineError;
use cradle_lib::recipe::Recipe;
use tracing::debug;

use crate::output::tool_output;

pub use build::cmd_build;
pub use create::cmd_create;
pub use export::cmd_export;
pub use generate::cmd_generate;
pub use info::cmd_info;
pub use inspect::cmd_inspect;
pub use package::cmd_package;

/// Arguments selecting the recipe, its settings and its options.
#[derive(Args, Debug, Clone)]
pub struct RecipeArgs {
  /// Source directory (default: current directory)
  #[arg(default_value = ".")]
  pub path: PathBuf,

  /// Setting assignment, e.g. `-s os=Windows` (os, arch, build_type)
  #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
  pub settings: Vec<String>,

  /// Option assignment, e.g. `-o shared=true`
  #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
  pub options: Vec<String>,

  /// Profile file with settings, options and tool configuration
  #[arg(long, value_name = "FILE")]
  pub profile: Option<PathBuf>,
}

/// A loaded recipe with the request it will run under.
pub struct Invocation {
  pub source: PathBuf,
  pub recipe: Recipe,
  pub request: BuildRequest,
}

impl Invocation {
  pub fn prepare(args: &RecipeArgs, on_empty_match: Option<EmptyMatchPolicy>) -> Result<Self> {
    let profile = args
      .profile
      .as_deref()
      .map(Profile::load)
      .transpose()
      .context("Failed to load profile")?;

    let cli = CliOverrides {
      settings: &args.settings,
      options: &args.options,
      on_empty_match,
    };
    let request = BuildRequest::assemble(profile.as_ref(), &cli).context("Invalid configuration")?;
    let recipe = Recipe::load(&args.path).context("Failed to load recipe")?;
    debug!(
      source = %args.path.display(),
      reference = %recipe.identity.reference(),
      settings = %request.settings,
      "prepared invocation"
    );

    Ok(Self {
      source: args.path.clone(),
      recipe,
      request,
    })
  }
}

pub fn runtime() -> Result<tokio::runtime::Runtime> {
  tokio::runtime::Runtime::new().context("Failed to create async runtime")
}

/// Attach the failing stage to a pipeline error, echoing the build tool's
/// last stderr lines first.
pub fn stage_error(err: PipelineError) -> anyhow::Error {
  let tail = match &err {
    PipelineError::Build { source, .. } | PipelineError::Test(source) => source.stderr_tail(20),
    _ => None,
  };
  if let Some(tail) = tail {
    tool_output(&tail);
  }

  let stage = err.stage();
  anyhow::Error::new(err).context(format!("{stage} stage failed"))
}
