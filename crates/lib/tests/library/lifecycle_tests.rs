//! `create`: export, build out of tree, and commit into the store.

use std::fs;

use cradle_lib::config::BuildRequest;
use cradle_lib::consts::PACKAGE_MANIFEST_FILENAME;
use cradle_lib::execute::BuildStep;
use cradle_lib::package::{EmptyMatchPolicy, PackageError, PackageManifest};
use cradle_lib::pipeline::{Pipeline, PipelineError, Stage};
use cradle_lib::platform::os::Os;
use cradle_lib::recipe::Recipe;

use super::common::{RecordingTool, TestEnv, request, tree};

mod scenarios {
  use super::*;

  #[tokio::test]
  async fn static_build_with_tests() {
    let env = TestEnv::new();
    let recipe = Recipe::cargparse();
    let request = request(Os::Linux, &[]);
    let tool = RecordingTool::producing(&["libcargparse.a", "tests/test_val"]);

    let outcome = Pipeline::new(&recipe, &request, &tool)
      .with_store(env.store())
      .with_builds(env.builds())
      .create(&env.checkout())
      .await
      .unwrap();

    assert_eq!(tool.calls(), vec![BuildStep::Configure, BuildStep::Compile, BuildStep::Test]);
    assert!(outcome.build.report.ran_tests());

    let config = &outcome.build.generated.config;
    assert_eq!(config.variable("TEST"), Some(true));
    assert_eq!(config.variable("SHARED_BUILD"), Some(false));
    assert_eq!(config.variable("EXAMPLE"), Some(false));
    assert_eq!(config.position_independent_code, Some(true));

    let folder = &outcome.package.package_folder;
    assert!(folder.starts_with(env.store().join("cargparse/0.3.1")));
    assert_eq!(
      tree(folder),
      vec![
        PACKAGE_MANIFEST_FILENAME,
        "include/ArgParse.h",
        "lib/libcargparse.a",
        "licenses/LICENSE",
      ]
    );

    let manifest = PackageManifest::load(folder).unwrap();
    assert_eq!(manifest, outcome.package.manifest);
    assert_eq!(manifest.reference, "cargparse/0.3.1");
    assert_eq!(manifest.cpp_info.libs, vec!["cargparse"]);
    assert_eq!(manifest.options.get("fPIC"), Some(&true));
    assert_eq!(manifest.options.get("shared"), Some(&false));
  }

  #[tokio::test]
  async fn shared_build_without_tests() {
    let env = TestEnv::new();
    let recipe = Recipe::cargparse();
    let request = request(Os::Linux, &["shared=true", "test=false"]);
    let tool = RecordingTool::producing(&["libcargparse.so"]);

    let outcome = Pipeline::new(&recipe, &request, &tool)
      .with_store(env.store())
      .with_builds(env.builds())
      .create(&env.checkout())
      .await
      .unwrap();

    assert_eq!(tool.calls(), vec![BuildStep::Configure, BuildStep::Compile]);
    assert!(!outcome.build.report.ran_tests());

    let config = &outcome.build.generated.config;
    assert_eq!(config.variable("TEST"), Some(false));
    assert_eq!(config.variable("SHARED_BUILD"), Some(true));
    assert_eq!(config.variable("EXAMPLE"), Some(false));
    assert_eq!(config.position_independent_code, None);

    let toolchain = fs::read_to_string(&outcome.build.generated.toolchain).unwrap();
    assert!(!toolchain.contains("CMAKE_POSITION_INDEPENDENT_CODE"));

    let manifest = &outcome.package.manifest;
    assert!(!manifest.options.contains_key("fPIC"));
    assert!(manifest.files.contains_key("lib/libcargparse.so"));
    assert!(!manifest.files.keys().any(|f| f.ends_with(".a")));
  }

  #[tokio::test]
  async fn windows_build_has_no_fpic() {
    let env = TestEnv::new();
    let recipe = Recipe::cargparse();
    let request = request(Os::Windows, &["shared=true", "fPIC=true"]);
    let tool = RecordingTool::producing(&["Release/cargparse.lib", "Release/cargparse.dll"]);

    let outcome = Pipeline::new(&recipe, &request, &tool)
      .with_store(env.store())
      .with_builds(env.builds())
      .create(&env.checkout())
      .await
      .unwrap();

    assert!(!outcome.package.manifest.options.contains_key("fPIC"));
    let files = tree(&outcome.package.package_folder);
    assert!(files.contains(&"lib/cargparse.lib".to_string()));
    assert!(files.contains(&"bin/cargparse.dll".to_string()));
  }
}

mod failures {
  use super::*;

  #[tokio::test]
  async fn failed_configure_leaves_no_package() {
    let env = TestEnv::new();
    let recipe = Recipe::cargparse();
    let request = request(Os::Linux, &[]);
    let tool = RecordingTool::failing(BuildStep::Configure);

    let err = Pipeline::new(&recipe, &request, &tool)
      .with_store(env.store())
      .with_builds(env.builds())
      .create(&env.checkout())
      .await
      .unwrap_err();

    assert!(matches!(
      err,
      PipelineError::Build {
        step: BuildStep::Configure,
        ..
      }
    ));
    assert_eq!(err.stage(), Stage::Build);
    assert_eq!(tool.calls(), vec![BuildStep::Configure]);
    assert!(!env.store().exists());
  }

  #[tokio::test]
  async fn failed_tests_leave_no_package() {
    let env = TestEnv::new();
    let recipe = Recipe::cargparse();
    let request = request(Os::Linux, &[]);
    let tool = RecordingTool {
      fail_on: Some(BuildStep::Test),
      outputs: vec!["libcargparse.a"],
      ..RecordingTool::default()
    };

    let err = Pipeline::new(&recipe, &request, &tool)
      .with_store(env.store())
      .with_builds(env.builds())
      .create(&env.checkout())
      .await
      .unwrap_err();

    assert!(matches!(err, PipelineError::Test(_)));
    assert!(!env.store().exists());
  }

  #[tokio::test]
  async fn empty_match_error_policy_aborts() {
    let env = TestEnv::new();
    let recipe = Recipe::cargparse();
    let mut request = request(Os::Linux, &["test=false"]);
    request.on_empty_match = EmptyMatchPolicy::Error;
    let tool = RecordingTool::producing(&["libcargparse.a"]);

    let err = Pipeline::new(&recipe, &request, &tool)
      .with_store(env.store())
      .with_builds(env.builds())
      .create(&env.checkout())
      .await
      .unwrap_err();

    assert!(matches!(err, PipelineError::Packaging(PackageError::EmptyMatch { .. })));
    assert_eq!(err.stage(), Stage::Package);
    assert!(!env.store().join("cargparse").exists());
  }

  #[tokio::test]
  async fn missing_checkout_is_an_error() {
    let env = TestEnv::new();
    let recipe = Recipe::cargparse();
    let request = request(Os::Linux, &[]);
    let tool = RecordingTool::default();

    let err = Pipeline::new(&recipe, &request, &tool)
      .with_store(env.store())
      .with_builds(env.builds())
      .create(&env.temp.path().join("nowhere"))
      .await
      .unwrap_err();

    assert!(matches!(err, PipelineError::Io { .. }));
    assert!(tool.calls().is_empty());
  }
}

mod store {
  use super::*;

  #[tokio::test]
  async fn no_binaries_still_packages_headers() {
    let env = TestEnv::new();
    let recipe = Recipe::cargparse();
    let request = request(Os::Linux, &["test=false"]);
    let tool = RecordingTool::default();

    let outcome = Pipeline::new(&recipe, &request, &tool)
      .with_store(env.store())
      .with_builds(env.builds())
      .create(&env.checkout())
      .await
      .unwrap();

    assert_eq!(
      tree(&outcome.package.package_folder),
      vec![PACKAGE_MANIFEST_FILENAME, "include/ArgParse.h", "licenses/LICENSE"]
    );
  }

  #[tokio::test]
  async fn recreate_replaces_package() {
    let env = TestEnv::new();
    let recipe = Recipe::cargparse();
    let request = request(Os::Linux, &["test=false"]);

    let first_tool = RecordingTool::producing(&["libcargparse.a", "extra/libhelper.a"]);
    let first = Pipeline::new(&recipe, &request, &first_tool)
      .with_store(env.store())
      .with_builds(env.builds())
      .create(&env.checkout())
      .await
      .unwrap();

    let second_tool = RecordingTool::producing(&["libcargparse.a"]);
    let second = Pipeline::new(&recipe, &request, &second_tool)
      .with_store(env.store())
      .with_builds(env.builds())
      .create(&env.checkout())
      .await
      .unwrap();

    assert_eq!(first.package.package_folder, second.package.package_folder);
    assert!(!tree(&second.package.package_folder).contains(&"lib/libhelper.a".to_string()));
  }

  #[test]
  fn package_id_depends_on_options() {
    let env = TestEnv::new();
    let recipe = Recipe::cargparse();
    let tool = RecordingTool::default();

    let static_request = request(Os::Linux, &[]);
    let shared_request = request(Os::Linux, &["shared=true"]);
    let id = |req: &BuildRequest| {
      Pipeline::new(&recipe, req, &tool)
        .with_store(env.store())
        .resolve()
        .unwrap()
        .package_id
    };

    assert_eq!(id(&static_request), id(&static_request));
    assert_ne!(id(&static_request), id(&shared_request));
    assert_eq!(id(&static_request).0.len(), 20);
  }

  #[tokio::test]
  async fn checkout_is_not_modified() {
    let env = TestEnv::new();
    let recipe = Recipe::cargparse();
    let request = request(Os::Linux, &[]);
    let tool = RecordingTool::producing(&["libcargparse.a"]);
    let before = tree(&env.checkout());

    Pipeline::new(&recipe, &request, &tool)
      .with_store(env.store())
      .with_builds(env.builds())
      .create(&env.checkout())
      .await
      .unwrap();

    assert_eq!(tree(&env.checkout()), before);
  }
}
