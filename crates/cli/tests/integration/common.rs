//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own checkout, store, cache and fake `cmake`.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// A cargparse checkout with no build outputs.
  pub fn with_checkout() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    for (rel, content) in [
      ("LICENSE", "MIT License\n"),
      ("CMakeLists.txt", "cmake_minimum_required(VERSION 3.15)\nproject(cargparse C)\n"),
      ("include/ArgParse.h", "#pragma once\n"),
      ("src/ArgParse.c", "#include \"ArgParse.h\"\n"),
      ("tests/test_val.c", "int main(void) { return 0; }\n"),
    ] {
      env.write_file(&format!("checkout/{rel}"), content);
    }
    env
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    let p = self.temp.path().join(relative_path);
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn checkout(&self) -> PathBuf {
    self.path("checkout")
  }

  pub fn store(&self) -> PathBuf {
    self.path("store")
  }

  /// Write a profile whose `[tools] cmake` points at `cmake`.
  pub fn profile_with_cmake(&self, cmake: &Path) -> PathBuf {
    self.write_file(
      "profile.toml",
      &format!(
        "[settings]\nos = \"Linux\"\nbuild_type = \"Release\"\n\n[tools]\ncmake = \"{}\"\ngenerator = \"Unix Makefiles\"\n",
        cmake.display()
      ),
    )
  }

  /// Get a pre-configured Command for the cradle binary.
  ///
  /// Sets environment variables for isolated testing:
  /// - `CRADLE_STORE`: Isolated package store
  /// - `CRADLE_CACHE`: Isolated build cache
  /// - `XDG_DATA_HOME` / `XDG_CACHE_HOME`: Isolated base directories
  pub fn cradle_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("cradle");
    cmd.env("CRADLE_STORE", self.store());
    cmd.env("CRADLE_CACHE", self.path("cache"));
    cmd.env("XDG_DATA_HOME", self.path("data"));
    cmd.env("XDG_CACHE_HOME", self.path("xdg-cache"));
    cmd.env_remove("RUST_LOG");
    cmd
  }
}

/// Install an executable `cmake` stand-in that logs its arguments.
///
/// Compile steps drop `libcargparse.so` when the toolchain selects a shared
/// build and `libcargparse.a` otherwise.
#[cfg(unix)]
pub fn fake_cmake(env: &TestEnv) -> (PathBuf, PathBuf) {
  let log = env.temp.path().join("cmake.log");
  let script = format!(
    r#"#!/bin/sh
echo "$@" >> "{log}"
if [ "$1" = "--build" ]; then
  dir="$2"
  case " $* " in
    *" --target test "*) echo ok > "$dir/tests-ran"; exit 0 ;;
  esac
  if grep -q 'set(SHARED_BUILD ON' "$dir/generators/cradle_toolchain.cmake"; then
    echo so > "$dir/libcargparse.so"
  else
    echo ar > "$dir/libcargparse.a"
  fi
fi
exit 0
"#,
    log = log.display()
  );
  (install_script(env, "fake-cmake", &script), log)
}

/// A `cmake` stand-in whose every invocation fails.
#[cfg(unix)]
pub fn broken_cmake(env: &TestEnv) -> PathBuf {
  install_script(env, "broken-cmake", "#!/bin/sh\necho \"CMake Error: boom\" >&2\nexit 1\n")
}

#[cfg(unix)]
fn install_script(env: &TestEnv, name: &str, content: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = env.write_file(&format!("bin/{name}"), content);
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}
