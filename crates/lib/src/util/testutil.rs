//! Test utilities for cradle-lib.
//!
//! Helpers that lay out a cargparse-like source tree and fake build outputs.

use std::fs;
use std::path::Path;

/// Write a minimal cargparse source checkout into `root`.
pub fn write_source_tree(root: &Path) {
  let files = [
    ("LICENSE", "MIT License\n"),
    ("CMakeLists.txt", "cmake_minimum_required(VERSION 3.15)\nproject(cargparse C)\n"),
    ("include/ArgParse.h", "#pragma once\n"),
    ("src/ArgParse.c", "#include \"ArgParse.h\"\n"),
    ("src/ArgParseTools.h", "#pragma once\n"),
    ("tests/test_val.c", "int main(void) { return 0; }\n"),
    ("examples/simple.c", "int main(void) { return 0; }\n"),
    ("README.md", "# cargparse\n"),
  ];
  for (rel, content) in files {
    write_file(&root.join(rel), content);
  }
}

/// Create empty files below `build` for each relative path in `outputs`.
pub fn write_build_outputs(build: &Path, outputs: &[&str]) {
  fs::create_dir_all(build).unwrap();
  for rel in outputs {
    write_file(&build.join(rel), rel);
  }
}

fn write_file(path: &Path, content: &str) {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, content).unwrap();
}

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}
