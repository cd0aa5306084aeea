mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cradle_lib::package::EmptyMatchPolicy;
use tracing_subscriber::EnvFilter;

use cmd::RecipeArgs;
use output::{OutputFormat, Status, status};

/// cradle - build, test and package the cargparse C library
#[derive(Parser)]
#[command(name = "cradle")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Log level or filter directive (overrides RUST_LOG)
  #[arg(long, global = true, value_name = "LEVEL")]
  log_level: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Export, build, test and package into the local store
  Create {
    #[command(flatten)]
    recipe: RecipeArgs,

    /// What to do when a packaging rule matches no files (ignore, warn, error)
    #[arg(long, value_name = "POLICY")]
    on_empty_match: Option<EmptyMatchPolicy>,
  },

  /// Show the resolved options, build configuration and package id
  Inspect {
    #[command(flatten)]
    recipe: RecipeArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Write the CMake toolchain into the source tree's generators folder
  Generate {
    #[command(flatten)]
    recipe: RecipeArgs,
  },

  /// Generate, configure, compile and test in the source tree
  Build {
    #[command(flatten)]
    recipe: RecipeArgs,
  },

  /// Package an existing build of the source tree
  Package {
    #[command(flatten)]
    recipe: RecipeArgs,

    /// Destination folder (default: <build folder>/package)
    #[arg(long, value_name = "DIR")]
    package_folder: Option<PathBuf>,

    /// What to do when a packaging rule matches no files (ignore, warn, error)
    #[arg(long, value_name = "POLICY")]
    on_empty_match: Option<EmptyMatchPolicy>,
  },

  /// Copy the recipe's exported sources into a directory
  Export {
    /// Source directory (default: current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Destination directory
    #[arg(long, value_name = "DIR")]
    to: PathBuf,
  },

  /// Show host platform and cradle directories
  Info {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },
}

fn init_tracing(verbose: bool, log_level: Option<&str>) {
  let filter = match (log_level, verbose) {
    (Some(level), _) => EnvFilter::new(level),
    (None, true) => EnvFilter::new("debug"),
    (None, false) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose, cli.log_level.as_deref());

  let result = match cli.command {
    Commands::Create { recipe, on_empty_match } => cmd::cmd_create(&recipe, on_empty_match),
    Commands::Inspect { recipe, format } => cmd::cmd_inspect(&recipe, format),
    Commands::Generate { recipe } => cmd::cmd_generate(&recipe),
    Commands::Build { recipe } => cmd::cmd_build(&recipe),
    Commands::Package {
      recipe,
      package_folder,
      on_empty_match,
    } => cmd::cmd_package(&recipe, package_folder.as_deref(), on_empty_match),
    Commands::Export { path, to } => cmd::cmd_export(&path, &to),
    Commands::Info { format } => cmd::cmd_info(format),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      status(Status::Failed, &format!("{err:#}"));
      ExitCode::FAILURE
    }
  }
}
