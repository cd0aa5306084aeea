//! Lifecycle orchestration.
//!
//! A recipe moves through a fixed sequence of stages:
//!
//! 1. `config_options` / `configure`: resolve the option set for the target
//! 2. `layout`: choose source, build, generators and package folders
//! 3. `generate`: derive the build configuration and write the toolchain
//! 4. `build`: configure, compile, and run the tests when enabled
//! 5. `package`: stage the declared artifacts
//! 6. `package_info`: describe what consumers link against
//!
//! Each stage returns a new value that the next one consumes. The first
//! failure stops the sequence and the error records which stage failed.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{BuildRequest, ConfigError};
use crate::execute::{BuildStep, BuildTool, ExecuteError};
use crate::export::export_sources;
use crate::layout::{Layout, is_multi_config};
use crate::options::ResolvedOptions;
use crate::package::{PackageError, PackageManifest, Roots, StagedPackage, check_destination, stage};
use crate::platform::paths::{PathsError, builds_dir, store_dir};
use crate::recipe::{CppInfo, Recipe, RecipeError};
use crate::toolchain::BuildConfiguration;
use crate::toolchain::cmake::write_toolchain;
use crate::util::hash::{HashError, PackageId};

/// The lifecycle stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
  ConfigOptions,
  Configure,
  Layout,
  Generate,
  Build,
  Package,
  PackageInfo,
}

impl Stage {
  pub const ALL: [Stage; 7] = [
    Stage::ConfigOptions,
    Stage::Configure,
    Stage::Layout,
    Stage::Generate,
    Stage::Build,
    Stage::Package,
    Stage::PackageInfo,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::ConfigOptions => "config_options",
      Self::Configure => "configure",
      Self::Layout => "layout",
      Self::Generate => "generate",
      Self::Build => "build",
      Self::Package => "package",
      Self::PackageInfo => "package_info",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("recipe error: {0}")]
  Recipe(#[from] RecipeError),

  #[error("configuration error: {0}")]
  Config(#[from] ConfigError),

  #[error("failed to compute package id: {0}")]
  PackageId(#[from] HashError),

  #[error("{step} step failed: {source}")]
  Build {
    step: BuildStep,
    #[source]
    source: ExecuteError,
  },

  #[error("tests failed: {0}")]
  Test(#[source] ExecuteError),

  #[error("packaging failed: {0}")]
  Packaging(#[from] PackageError),

  #[error("{0}")]
  Paths(#[from] PathsError),

  #[error("{stage} stage failed: {source}")]
  Io {
    stage: Stage,
    #[source]
    source: io::Error,
  },
}

impl PipelineError {
  /// The stage the failure happened in.
  pub fn stage(&self) -> Stage {
    match self {
      Self::Recipe(_) | Self::Config(_) => Stage::ConfigOptions,
      Self::PackageId(_) => Stage::Configure,
      Self::Build { .. } | Self::Test(_) => Stage::Build,
      Self::Packaging(_) => Stage::Package,
      Self::Paths(_) => Stage::Layout,
      Self::Io { stage, .. } => *stage,
    }
  }

  fn io(stage: Stage) -> impl FnOnce(io::Error) -> Self {
    move |source| Self::Io { stage, source }
  }
}

/// Output of the first two stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
  pub options: ResolvedOptions,
  pub package_id: PackageId,
}

/// Which build-tool steps ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
  pub steps: Vec<BuildStep>,
}

impl BuildReport {
  pub fn ran_tests(&self) -> bool {
    self.steps.contains(&BuildStep::Test)
  }
}

#[derive(Debug, Clone)]
pub struct GenerateOutcome {
  pub resolution: Resolution,
  pub layout: Layout,
  pub config: BuildConfiguration,
  pub toolchain: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
  pub generated: GenerateOutcome,
  pub report: BuildReport,
}

#[derive(Debug, Clone)]
pub struct PackageOutcome {
  pub package_folder: PathBuf,
  pub manifest: PackageManifest,
}

#[derive(Debug, Clone)]
pub struct CreateOutcome {
  pub build: BuildOutcome,
  pub package: PackageOutcome,
}

/// Runs one recipe through its lifecycle with one build request.
pub struct Pipeline<'a, T: BuildTool> {
  recipe: &'a Recipe,
  request: &'a BuildRequest,
  tool: &'a T,
  store: Option<PathBuf>,
  builds: Option<PathBuf>,
}

impl<'a, T: BuildTool> Pipeline<'a, T> {
  pub fn new(recipe: &'a Recipe, request: &'a BuildRequest, tool: &'a T) -> Self {
    Self {
      recipe,
      request,
      tool,
      store: None,
      builds: None,
    }
  }

  pub fn with_store(mut self, store: PathBuf) -> Self {
    self.store = Some(store);
    self
  }

  pub fn with_builds(mut self, builds: PathBuf) -> Self {
    self.builds = Some(builds);
    self
  }

  /// Where `create` commits a package with the given id.
  ///
  /// Without an explicit store the platform data directory is looked up
  /// here, so only `create` depends on it.
  pub fn store_folder(&self, package_id: &PackageId) -> Result<PathBuf, PipelineError> {
    let store = match &self.store {
      Some(store) => store.clone(),
      None => store_dir()?,
    };
    Ok(
      store
        .join(&self.recipe.identity.name)
        .join(&self.recipe.identity.version)
        .join(&package_id.0),
    )
  }

  /// Where `create` exports and builds a package with the given id.
  pub fn build_folder(&self, package_id: &PackageId) -> Result<PathBuf, PipelineError> {
    let builds = match &self.builds {
      Some(builds) => builds.clone(),
      None => builds_dir()?,
    };
    let identity = &self.recipe.identity;
    Ok(builds.join(format!("{}-{}-{}", identity.name, identity.version, package_id)))
  }

  /// `config_options` + `configure`.
  pub fn resolve(&self) -> Result<Resolution, PipelineError> {
    let settings = &self.request.settings;
    info!(stage = %Stage::ConfigOptions, os = %settings.os, "resolving option domain");
    info!(stage = %Stage::Configure, "resolving options");

    let options = self.recipe.resolve_options(&self.request.overrides, settings.os);
    let package_id = self.recipe.package_id(settings, &options)?;
    debug!(options = ?options.to_map(), package_id = %package_id, "options resolved");

    Ok(Resolution { options, package_id })
  }

  pub fn layout(&self, source: &Path, package: &Path) -> Layout {
    info!(stage = %Stage::Layout, source = %source.display(), "computing layout");
    let multi_config = is_multi_config(self.request.tools.generator.as_deref());
    Layout::cmake(source, self.request.settings.build_type, multi_config, package)
  }

  /// `generate`: write the toolchain for the resolved options.
  pub fn generate(&self, layout: &Layout, resolution: &Resolution) -> Result<GenerateOutcome, PipelineError> {
    info!(stage = %Stage::Generate, generators = %layout.generators.display(), "generating build files");

    let config = BuildConfiguration::generate(&resolution.options, &self.request.settings);
    let toolchain = write_toolchain(layout, &config, &self.recipe.identity.reference())
      .map_err(PipelineError::io(Stage::Generate))?;

    Ok(GenerateOutcome {
      resolution: resolution.clone(),
      layout: layout.clone(),
      config,
      toolchain,
    })
  }

  /// `build`: configure and compile; run the tests only when `TEST` is on.
  pub async fn build(&self, layout: &Layout, config: &BuildConfiguration) -> Result<BuildReport, PipelineError> {
    info!(stage = %Stage::Build, build = %layout.build.display(), "building");
    let mut report = BuildReport::default();

    self
      .tool
      .configure(layout, config)
      .await
      .map_err(|source| PipelineError::Build {
        step: BuildStep::Configure,
        source,
      })?;
    report.steps.push(BuildStep::Configure);

    self
      .tool
      .build(layout, config)
      .await
      .map_err(|source| PipelineError::Build {
        step: BuildStep::Compile,
        source,
      })?;
    report.steps.push(BuildStep::Compile);

    if config.runs_tests() {
      self.tool.test(layout, config).await.map_err(PipelineError::Test)?;
      report.steps.push(BuildStep::Test);
    } else {
      info!("tests disabled, skipping test runner");
    }

    Ok(report)
  }

  /// `package`: stage the recipe's artifacts for `layout.package`.
  pub fn package(&self, layout: &Layout) -> Result<StagedPackage, PipelineError> {
    info!(stage = %Stage::Package, package = %layout.package.display(), "collecting artifacts");

    if !layout.build.is_dir() {
      warn!(build = %layout.build.display(), "build folder does not exist, no binaries will be packaged");
    }

    let roots = Roots {
      source: &layout.source,
      build: &layout.build,
    };
    Ok(stage(
      &self.recipe.package,
      &roots,
      &layout.package,
      self.request.on_empty_match,
    )?)
  }

  /// `package_info`
  pub fn package_info(&self) -> CppInfo {
    info!(stage = %Stage::PackageInfo, libs = ?self.recipe.libs, "describing package");
    self.recipe.package_info()
  }

  /// Write the package metadata into a staged package and move it into
  /// `layout.package`.
  pub fn commit(
    &self,
    staged: StagedPackage,
    layout: &Layout,
    resolution: &Resolution,
    cpp_info: &CppInfo,
  ) -> Result<PackageOutcome, PipelineError> {
    let manifest = PackageManifest::describe(
      &self.recipe.identity,
      &resolution.package_id,
      &self.request.settings,
      &resolution.options,
      cpp_info,
      staged.path(),
      staged.files(),
    )?;
    staged.write_manifest(&manifest)?;

    if let Some(parent) = layout.package.parent() {
      fs::create_dir_all(parent).map_err(PipelineError::io(Stage::Package))?;
    }
    let package_folder = staged.commit(&layout.package)?;

    Ok(PackageOutcome {
      package_folder,
      manifest,
    })
  }

  /// Full lifecycle: export the sources, build them out of tree, and
  /// commit the package into the store.
  pub async fn create(&self, source_dir: &Path) -> Result<CreateOutcome, PipelineError> {
    let checkout = canonical(source_dir, Stage::ConfigOptions)?;
    let resolution = self.resolve()?;

    let store_folder = self.store_folder(&resolution.package_id)?;
    let build_root = self.build_folder(&resolution.package_id)?;
    if build_root.exists() {
      debug!(path = %build_root.display(), "removing previous build folder");
      fs::remove_dir_all(&build_root).map_err(PipelineError::io(Stage::Layout))?;
    }
    let exported = build_root.join("src");
    export_sources(self.recipe, &checkout, &exported)?;

    let layout = self.layout(&exported, &store_folder);
    let generated = self.generate(&layout, &resolution)?;
    let report = self.build(&layout, &generated.config).await?;

    let staged = self.package(&layout)?;
    let cpp_info = self.package_info();
    let package = self.commit(staged, &layout, &resolution, &cpp_info)?;

    info!(
      reference = %self.recipe.identity.reference(),
      package_id = %resolution.package_id,
      path = %package.package_folder.display(),
      "package created"
    );

    Ok(CreateOutcome {
      build: BuildOutcome { generated, report },
      package,
    })
  }

  /// Local generate: toolchain files in the source checkout.
  pub fn generate_local(&self, source_dir: &Path) -> Result<GenerateOutcome, PipelineError> {
    let source = canonical(source_dir, Stage::ConfigOptions)?;
    let resolution = self.resolve()?;
    let layout = self.local_layout(&source, None)?;
    self.generate(&layout, &resolution)
  }

  /// Local build: generate, then build in the source checkout.
  pub async fn build_local(&self, source_dir: &Path) -> Result<BuildOutcome, PipelineError> {
    let generated = self.generate_local(source_dir)?;
    let report = self.build(&generated.layout, &generated.config).await?;
    Ok(BuildOutcome { generated, report })
  }

  /// Local package: collect an existing build of the checkout.
  ///
  /// The package goes to `package_folder`, or `<build>/package` by default.
  /// A folder that overlaps the checkout is refused before anything is
  /// staged.
  pub fn package_local(&self, source_dir: &Path, package_folder: Option<&Path>) -> Result<PackageOutcome, PipelineError> {
    let source = canonical(source_dir, Stage::ConfigOptions)?;
    let resolution = self.resolve()?;
    let layout = self.local_layout(&source, package_folder)?;
    let staged = self.package(&layout)?;
    let cpp_info = self.package_info();
    self.commit(staged, &layout, &resolution, &cpp_info)
  }

  fn local_layout(&self, source: &Path, package_folder: Option<&Path>) -> Result<Layout, PipelineError> {
    let mut layout = self.layout(source, Path::new(""));
    layout.package = match package_folder {
      Some(folder) => resolve_destination(folder)?,
      None => layout.build.join("package"),
    };

    let roots = Roots {
      source: &layout.source,
      build: &layout.build,
    };
    check_destination(&layout.package, &roots, &layout.source.join("build"))?;
    Ok(layout)
  }
}

fn canonical(dir: &Path, stage: Stage) -> Result<PathBuf, PipelineError> {
  dunce::canonicalize(dir).map_err(PipelineError::io(stage))
}

/// Absolute form of a folder that may not exist yet: the deepest existing
/// ancestor is canonicalized and the missing components are appended.
fn resolve_destination(dest: &Path) -> Result<PathBuf, PipelineError> {
  let absolute = std::path::absolute(dest).map_err(PipelineError::io(Stage::Package))?;
  let mut existing = absolute.as_path();
  let mut missing = Vec::new();
  while !existing.exists() {
    match (existing.parent(), existing.file_name()) {
      (Some(parent), Some(name)) => {
        missing.push(name.to_os_string());
        existing = parent;
      }
      _ => break,
    }
  }

  let mut resolved = canonical(existing, Stage::Package)?;
  resolved.extend(missing.iter().rev());
  Ok(resolved)
}
