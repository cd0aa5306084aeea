//! Local flows: generate, build and package inside a checkout.

use std::fs;

use cradle_lib::consts::PACKAGE_MANIFEST_FILENAME;
use cradle_lib::execute::BuildStep;
use cradle_lib::package::PackageError;
use cradle_lib::pipeline::{Pipeline, PipelineError, Stage};
use cradle_lib::platform::os::Os;
use cradle_lib::recipe::Recipe;

use serial_test::serial;

use super::common::{RecordingTool, TestEnv, request, tree, write_file};

#[test]
fn generate_writes_toolchain_into_checkout() {
  let env = TestEnv::new();
  let recipe = Recipe::cargparse();
  let request = request(Os::Linux, &["example=true"]);
  let tool = RecordingTool::default();
  let pipeline = Pipeline::new(&recipe, &request, &tool);

  let first = pipeline.generate_local(&env.checkout()).unwrap();
  let bytes = fs::read(&first.toolchain).unwrap();
  let second = pipeline.generate_local(&env.checkout()).unwrap();

  assert_eq!(first.toolchain, second.toolchain);
  assert_eq!(fs::read(&second.toolchain).unwrap(), bytes);
  assert!(first.toolchain.ends_with("build/Release/generators/cradle_toolchain.cmake"));
  assert!(first.layout.build_config_file().is_file());
  assert_eq!(first.config.variable("EXAMPLE"), Some(true));
  assert!(tool.calls().is_empty());
}

#[tokio::test]
async fn build_then_package_locally() {
  let env = TestEnv::new();
  let recipe = Recipe::cargparse();
  let request = request(Os::Linux, &[]);
  let tool = RecordingTool::producing(&["libcargparse.a"]);
  let pipeline = Pipeline::new(&recipe, &request, &tool);

  let built = pipeline.build_local(&env.checkout()).await.unwrap();
  assert_eq!(tool.calls(), vec![BuildStep::Configure, BuildStep::Compile, BuildStep::Test]);
  assert!(built.generated.layout.build.join("libcargparse.a").is_file());

  let packaged = pipeline.package_local(&env.checkout(), None).unwrap();
  assert_eq!(packaged.package_folder, built.generated.layout.build.join("package"));
  assert_eq!(
    tree(&packaged.package_folder),
    vec![
      PACKAGE_MANIFEST_FILENAME,
      "include/ArgParse.h",
      "lib/libcargparse.a",
      "licenses/LICENSE",
    ]
  );

  // Packaging again must not pick up the previous package as a build output.
  let again = pipeline.package_local(&env.checkout(), None).unwrap();
  assert_eq!(again.manifest.files, packaged.manifest.files);
}

#[test]
fn package_into_explicit_folder() {
  let env = TestEnv::new();
  let recipe = Recipe::cargparse();
  let request = request(Os::Linux, &["shared=true"]);
  let tool = RecordingTool::default();
  write_file(&env.checkout().join("build/Release/lib/libcargparse.so"), "elf");
  write_file(&env.checkout().join("build/Release/notes.txt"), "not an artifact");

  let target = env.temp.path().join("out/pkg");
  let packaged = Pipeline::new(&recipe, &request, &tool)
    .package_local(&env.checkout(), Some(&target))
    .unwrap();

  assert!(packaged.package_folder.ends_with("out/pkg"));
  let files = tree(&target);
  assert!(files.contains(&"lib/libcargparse.so".to_string()));
  assert!(!files.iter().any(|f| f.ends_with("notes.txt")));
  assert!(!packaged.manifest.options.contains_key("fPIC"));
}

#[test]
fn package_refuses_folders_overlapping_the_checkout() {
  let env = TestEnv::new();
  let recipe = Recipe::cargparse();
  let request = request(Os::Linux, &[]);
  let tool = RecordingTool::default();
  let pipeline = Pipeline::new(&recipe, &request, &tool);
  write_file(&env.checkout().join("build/Release/libcargparse.a"), "ar");
  write_file(&env.checkout().join("include/extra_private.h"), "#pragma once\n");
  let before = tree(&env.checkout());

  for dest in [
    env.checkout(),
    env.checkout().join("include"),
    env.checkout().join("fresh"),
    env.checkout().join("build"),
    env.checkout().join("build/Release"),
    env.temp.path().to_path_buf(),
  ] {
    let err = pipeline.package_local(&env.checkout(), Some(&dest)).unwrap_err();
    assert!(
      matches!(err, PipelineError::Packaging(PackageError::UnsafeDestination { .. })),
      "{} was accepted: {err}",
      dest.display()
    );
    assert_eq!(err.stage(), Stage::Package);
  }

  assert_eq!(tree(&env.checkout()), before);
}

#[test]
fn package_keeps_unrelated_existing_folder() {
  let env = TestEnv::new();
  let recipe = Recipe::cargparse();
  let request = request(Os::Linux, &[]);
  let tool = RecordingTool::default();
  write_file(&env.checkout().join("build/Release/libcargparse.a"), "ar");
  let target = env.temp.path().join("documents");
  write_file(&target.join("thesis.txt"), "do not delete");

  let err = Pipeline::new(&recipe, &request, &tool)
    .package_local(&env.checkout(), Some(&target))
    .unwrap_err();

  assert!(matches!(err, PipelineError::Packaging(PackageError::UnsafeDestination { .. })));
  assert_eq!(tree(&target), vec!["thesis.txt"]);
}

#[test]
#[serial]
fn local_flows_do_not_need_a_home_directory() {
  let env = TestEnv::new();
  let recipe = Recipe::cargparse();
  let request = request(Os::Linux, &[]);
  let tool = RecordingTool::default();
  write_file(&env.checkout().join("build/Release/libcargparse.a"), "ar");

  temp_env::with_vars(
    [
      ("HOME", None::<&str>),
      ("USERPROFILE", None),
      ("APPDATA", None),
      ("LOCALAPPDATA", None),
      ("XDG_DATA_HOME", None),
      ("XDG_CACHE_HOME", None),
      ("CRADLE_STORE", None),
      ("CRADLE_CACHE", None),
    ],
    || {
      let pipeline = Pipeline::new(&recipe, &request, &tool);
      pipeline.generate_local(&env.checkout()).unwrap();
      pipeline.package_local(&env.checkout(), None).unwrap();

      let resolution = pipeline.resolve().unwrap();
      let err = pipeline.store_folder(&resolution.package_id).unwrap_err();
      assert!(matches!(err, PipelineError::Paths(_)));
      assert_eq!(err.stage(), Stage::Layout);
    },
  );
}
